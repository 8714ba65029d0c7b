pub mod page_config;
pub mod patch;

pub use page_config::*;
pub use patch::{RecoveryOutcome, RecoveryPatch};
