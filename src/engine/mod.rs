pub mod poller;
pub mod resolver;
pub mod setup;
pub mod sync;

pub use poller::{PollLimits, poll_until};
pub use resolver::{Resolution, Selection, resolve, resolve_preference, select_available};
pub use setup::SetupStep;
pub use sync::{EngineState, SyncEngine, SyncSession};
