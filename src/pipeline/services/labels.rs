use crate::error::LabelError;
use crate::pipeline::types::ClassId;
use indexmap::IndexMap;
use std::path::Path;

/// Human-readable class names, used for diagnostics only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTable {
    labels: IndexMap<ClassId, String>,
}

impl LabelTable {
    /// Names for the road objects the bundled model is trained on.
    pub fn builtin() -> Self {
        let labels = [
            (1, "box"),
            (2, "green light"),
            (3, "left"),
            (4, "person 1"),
            (5, "person 2"),
            (6, "person 3"),
            (7, "red light"),
            (8, "right"),
            (9, "tree"),
        ]
        .into_iter()
        .map(|(id, name)| (ClassId(id), name.to_string()))
        .collect();
        Self { labels }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelError> {
        let path = path.as_ref();
        tracing::info!("Loading labels from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parses one `<id> <name>` pair per line. Blank lines are skipped.
    pub fn parse(contents: &str) -> Result<Self, LabelError> {
        let mut labels = IndexMap::new();
        for (index, raw) in contents.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (id, name) = trimmed
                .split_once(char::is_whitespace)
                .map(|(id, name)| (id, name.trim()))
                .filter(|(_, name)| !name.is_empty())
                .ok_or_else(|| LabelError::Malformed {
                    line,
                    content: trimmed.to_string(),
                })?;
            let class_id = id
                .parse::<u32>()
                .map(ClassId)
                .map_err(|_| LabelError::InvalidClassId {
                    line,
                    value: id.to_string(),
                })?;
            if labels.insert(class_id, name.to_string()).is_some() {
                return Err(LabelError::Duplicate { line, class_id });
            }
        }
        Ok(Self { labels })
    }

    pub fn name(&self, class_id: ClassId) -> Option<&str> {
        self.labels.get(&class_id).map(String::as_str)
    }

    /// Label for logging, falling back to the numeric id.
    pub fn display_name(&self, class_id: ClassId) -> String {
        self.name(class_id)
            .map(str::to_string)
            .unwrap_or_else(|| class_id.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &str)> {
        self.labels.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
