//! TD(lambda) learning on top of the n-tuple network.
//!
//! - **TdConfig**: learning parameters
//! - **EligibilityHistory**: the finite trace of recent positions
//! - **NTupleValueFunction**: scoring and the three update rules
//! - **Snapshot**: binary persistence

pub mod config;
pub mod history;
pub mod snapshot;
pub mod value_function;

pub use config::{horizon_for, TargetMode, TdConfig};
pub use history::{EligibilityHistory, EquivBoards, EquivState};
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use value_function::{NTupleValueFunction, UpdateOutcome};
