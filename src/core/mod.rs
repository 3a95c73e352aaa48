//! Core types: players, board vectors and geometry, reproducible RNG.
//!
//! These are game-agnostic. A game adapter describes its boards through
//! `BoardGeometry` rather than by extending the engine.

pub mod board;
pub mod player;
pub mod rng;

pub use board::{Board, BoardGeometry, Cell};
pub use player::{PlayerId, PlayerMap};
pub use rng::WeightRng;
