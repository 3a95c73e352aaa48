//! N-tuple weight storage.
//!
//! - **NTuple**: sample points plus one dense lookup table
//! - **NTupleNetwork**: every n-tuple, once per player
//! - **TC**: optional per-weight temporal coherence factors

pub mod network;
pub mod tc;
pub mod tuple;

pub use network::{LutSummary, NTupleNetwork, TupleSums};
pub use tc::{TcConfig, TcTable, TcTransfer};
pub use tuple::{NTuple, SamplePoints, TupleKey, WeightInit, MAX_TABLE_SIZE};
