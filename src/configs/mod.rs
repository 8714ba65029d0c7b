pub mod base;
pub mod logging;
pub mod quality;
pub mod recovery;

pub use base::*;
pub use logging::*;
pub use quality::*;
pub use recovery::*;
