//! Session layer - busy lease, replay cache and the in-memory host

pub mod guard;
pub mod host;
pub mod replay;

pub use guard::{BusyLease, GameTable};
pub use host::SessionHost;
pub use replay::{ReplayCache, ReplayKey};
