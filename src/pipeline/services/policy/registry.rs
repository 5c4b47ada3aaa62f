use super::Policy;
use crate::error::{ConfigurationError, DecisionError};
use crate::pipeline::services::labels::LabelTable;
use crate::pipeline::types::{ClassId, Detection, VehicleState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of the class → policy table, as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub class_id: ClassId,
    pub policy: Policy,
}

impl PolicyEntry {
    pub fn new(class_id: u32, policy: Policy) -> Self {
        Self {
            class_id: ClassId(class_id),
            policy,
        }
    }

    /// The table the bundled road-object model ships with.
    pub fn builtin_table() -> Vec<PolicyEntry> {
        vec![
            PolicyEntry::new(1, Policy::Stop),
            PolicyEntry::new(2, Policy::Continue),
            PolicyEntry::new(3, Policy::TurnLeft),
            PolicyEntry::new(4, Policy::Stop),
            PolicyEntry::new(5, Policy::Stop),
            PolicyEntry::new(6, Policy::Stop),
            PolicyEntry::new(7, Policy::Stop),
            PolicyEntry::new(8, Policy::TurnRight),
            PolicyEntry::new(9, Policy::Stop),
        ]
    }
}

/// Immutable class → policy mapping, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyRegistry {
    policies: IndexMap<ClassId, Policy>,
    turn_angle: f32,
}

impl PolicyRegistry {
    pub fn builtin(turn_angle: f32) -> Self {
        let policies = PolicyEntry::builtin_table()
            .into_iter()
            .map(|entry| (entry.class_id, entry.policy))
            .collect();
        Self {
            policies,
            turn_angle,
        }
    }

    pub fn from_entries(
        entries: &[PolicyEntry],
        turn_angle: f32,
    ) -> Result<Self, ConfigurationError> {
        if !turn_angle.is_finite() {
            return Err(ConfigurationError::InvalidTurnAngle(turn_angle));
        }
        let mut policies = IndexMap::with_capacity(entries.len());
        for entry in entries {
            if policies.insert(entry.class_id, entry.policy).is_some() {
                return Err(ConfigurationError::DuplicatePolicy(entry.class_id));
            }
        }
        Ok(Self {
            policies,
            turn_angle,
        })
    }

    pub fn policy_for(&self, class_id: ClassId) -> Result<Policy, DecisionError> {
        self.policies
            .get(&class_id)
            .copied()
            .ok_or(DecisionError::UnknownClass(class_id))
    }

    pub fn apply(
        &self,
        policy: Policy,
        state: VehicleState,
        detection: &Detection,
    ) -> VehicleState {
        policy.apply(state, detection, self.turn_angle)
    }

    /// Fails if any labelled class would reach the engine without a policy.
    pub fn validate_against(&self, labels: &LabelTable) -> Result<(), ConfigurationError> {
        for (class_id, label) in labels.iter() {
            if !self.policies.contains_key(&class_id) {
                return Err(ConfigurationError::MissingPolicy {
                    class_id,
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn turn_angle(&self) -> f32 {
        self.turn_angle
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let registry = PolicyRegistry::builtin(90.0);
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.policy_for(ClassId(1)), Ok(Policy::Stop));
        assert_eq!(registry.policy_for(ClassId(2)), Ok(Policy::Continue));
        assert_eq!(registry.policy_for(ClassId(3)), Ok(Policy::TurnLeft));
        assert_eq!(registry.policy_for(ClassId(5)), Ok(Policy::Stop));
        assert_eq!(registry.policy_for(ClassId(7)), Ok(Policy::Stop));
        assert_eq!(registry.policy_for(ClassId(8)), Ok(Policy::TurnRight));
        assert_eq!(registry.policy_for(ClassId(9)), Ok(Policy::Stop));
    }

    #[test]
    fn test_unknown_class() {
        let registry = PolicyRegistry::builtin(90.0);
        assert_eq!(
            registry.policy_for(ClassId(42)),
            Err(DecisionError::UnknownClass(ClassId(42)))
        );
    }

    #[test]
    fn test_builtin_covers_builtin_labels() {
        let registry = PolicyRegistry::builtin(90.0);
        assert!(registry.validate_against(&LabelTable::builtin()).is_ok());
    }

    #[test]
    fn test_missing_policy_for_label() {
        let registry =
            PolicyRegistry::from_entries(&[PolicyEntry::new(7, Policy::Stop)], 90.0).unwrap();
        let labels = LabelTable::parse("7 red light\n2 green light\n").unwrap();
        let result = registry.validate_against(&labels);
        assert!(matches!(
            result,
            Err(ConfigurationError::MissingPolicy {
                class_id: ClassId(2),
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let entries = [
            PolicyEntry::new(7, Policy::Stop),
            PolicyEntry::new(7, Policy::Continue),
        ];
        assert!(matches!(
            PolicyRegistry::from_entries(&entries, 90.0),
            Err(ConfigurationError::DuplicatePolicy(ClassId(7)))
        ));
    }

    #[test]
    fn test_non_finite_turn_angle_rejected() {
        assert!(matches!(
            PolicyRegistry::from_entries(&PolicyEntry::builtin_table(), f32::NAN),
            Err(ConfigurationError::InvalidTurnAngle(_))
        ));
    }

    #[test]
    fn test_apply_uses_configured_turn_angle() {
        let registry = PolicyRegistry::builtin(30.0);
        let detection = Detection::new(
            3,
            crate::pipeline::types::BoundingBox::from_corners(0.0, 0.0, 10.0, 40.0),
            0.9,
        );
        let next = registry.apply(Policy::TurnLeft, VehicleState::cruising(40.0), &detection);
        assert_eq!(next.heading_delta, -30.0);
    }
}
