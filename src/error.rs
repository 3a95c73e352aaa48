//! Error types.
//!
//! - [`ValidationError`]: malformed caller input (boards, players, symmetry
//!   sets, lambda). Always surfaced, never clamped.
//! - [`ConfigError`]: an engine or tuple that cannot be built.
//! - [`SnapshotError`]: persistence failures and version mismatches.

use thiserror::Error;

/// Malformed input detected at the scoring/update boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("board has {actual} cells, expected {expected}")]
    BoardLength { expected: usize, actual: usize },

    #[error("cell {cell} holds position value {value}, expected a value below {limit}")]
    PositionValueOutOfRange { cell: usize, value: usize, limit: usize },

    #[error("sample point {point} lies past the end of a board with {len} cells")]
    BoardTooShort { point: usize, len: usize },

    #[error("sample point {point} of n-tuple {tuple} is outside 0..{num_cells}")]
    SamplePointOutOfRange {
        tuple: usize,
        point: usize,
        num_cells: usize,
    },

    #[error("player {player} is out of range for a {num_players}-player game")]
    PlayerOutOfRange { player: usize, num_players: usize },

    #[error("symmetry expansion returned no boards")]
    EmptyEquivalenceSet,

    #[error("equivalent board {index} has {actual} cells, expected {expected}")]
    EquivalenceLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("first equivalent board differs from the expanded board")]
    EquivalenceFirstNotInput,

    #[error("lambda must lie in [0, 1) for a finite horizon, got {0}")]
    InvalidLambda(f64),

    #[error("symmetry {index} is not a permutation of the board cells")]
    NotAPermutation { index: usize },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
}

/// Configuration that cannot produce a working engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one n-tuple is required")]
    NoTuples,

    #[error("at least one player is required (at most 255)")]
    NoPlayers,

    #[error("board must have at least one cell")]
    NoCells,

    #[error("at least one position value is required")]
    NoPositionValues,

    #[error("n-tuple {tuple} has no sample points")]
    EmptyTuple { tuple: usize },

    #[error("n-tuple with {arity} points over {num_position_values} values needs more than {limit} weights")]
    TableTooLarge {
        arity: usize,
        num_position_values: usize,
        limit: usize,
    },

    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Failure while saving or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] bincode::Error),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot version {found} does not match supported version {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("snapshot is inconsistent: {0}")]
    Corrupt(String),
}

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
