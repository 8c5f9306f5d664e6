pub mod indicators;
pub mod registry;
pub mod traits;

pub use registry::{RuleKind, RuleRegistry};
pub use traits::{Rule, RuleParams};
