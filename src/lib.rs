//! # ntuple-td
//!
//! N-tuple network value functions for board games, trained with
//! finite-horizon TD(lambda).
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: The engine only sees flat board vectors. A game
//!    describes itself through `BoardGeometry` and a `SymmetryExpander`
//!    (or a `GameAdapter` bundling both).
//!
//! 2. **N-Player First**: Every player gets its own copy of the weight
//!    tables; every call names the player.
//!
//! 3. **Validate, Then Mutate**: Boards, players and symmetry sets are
//!    checked before the first weight changes. Errors are returned, never
//!    clamped away.
//!
//! ## Architecture
//!
//! - **Dense Tables**: Each n-tuple owns a `num_position_values ^ arity`
//!   table addressed by a validated mixed-radix `TupleKey`.
//!
//! - **Finite Trace**: Instead of per-weight eligibility traces the last
//!   `horizon + 1` positions are replayed with factors `lambda^k`.
//!
//! ## Modules
//!
//! - `core`: Players, board vectors, geometry, reproducible RNG
//! - `ntuple`: N-tuples, the per-player network, temporal coherence
//! - `symmetry`: Symmetry expansion and the game adapter interface
//! - `learning`: TD configuration, eligibility history, the value function, snapshots
//! - `error`: Error types

pub mod core;
pub mod error;
pub mod learning;
pub mod ntuple;
pub mod symmetry;

// Re-export commonly used types
pub use crate::core::{Board, BoardGeometry, Cell, PlayerId, PlayerMap, WeightRng};

pub use crate::error::{ConfigError, Error, Result, SnapshotError, ValidationError};

pub use crate::ntuple::{
    LutSummary, NTuple, NTupleNetwork, TcConfig, TcTable, TcTransfer, TupleKey, TupleSums,
    WeightInit,
};

pub use crate::symmetry::{
    check_permutations, CellPermutations, FnExpander, GameAdapter, Identity, SymmetryExpander,
};

pub use crate::learning::{
    horizon_for, EligibilityHistory, EquivState, NTupleValueFunction, Snapshot, TargetMode,
    TdConfig, UpdateOutcome, SNAPSHOT_VERSION,
};
