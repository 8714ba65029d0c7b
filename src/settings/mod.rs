pub mod quality;
pub mod store;

pub use quality::QualityTable;
pub use store::*;
