//! Network time synchronisation: the connection deadline and the state
//! machine that drives one association attempt at a time.

pub mod machine;
pub mod timer;

pub use machine::{SyncState, SyncStateMachine};
pub use timer::ConnectionTimer;
