mod policy;
mod registry;

pub use policy::Policy;
pub use registry::{PolicyEntry, PolicyRegistry};
