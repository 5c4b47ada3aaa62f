pub mod annotation;

pub use annotation::{BoxOutlineAnnotator, FrameAnnotator};
