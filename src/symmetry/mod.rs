//! Board symmetries and the game adapter interface.
//!
//! The engine never knows a game's symmetry group. It asks a
//! [`SymmetryExpander`] for all boards equivalent to a given one and shares
//! learning across them. Contract of [`SymmetryExpander::expand`]:
//!
//! - the result is non-empty
//! - the first board equals the input
//! - every board has the input's length
//!
//! The engine checks all three on every expansion.

pub mod permutation;

pub use permutation::{check_permutations, CellPermutations};

use crate::core::{Board, BoardGeometry, Cell};

/// Produces the boards equivalent to a given board, itself first.
pub trait SymmetryExpander {
    /// Expand `board` into its equivalence set.
    fn expand(&self, board: &[Cell]) -> Vec<Board>;
}

impl<T: SymmetryExpander + ?Sized> SymmetryExpander for Box<T> {
    fn expand(&self, board: &[Cell]) -> Vec<Board> {
        (**self).expand(board)
    }
}

/// The trivial symmetry group: every board is only equivalent to itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Identity;

impl SymmetryExpander for Identity {
    fn expand(&self, board: &[Cell]) -> Vec<Board> {
        vec![board.to_vec()]
    }
}

/// Symmetry expansion backed by a closure.
///
/// ```
/// use ntuple_td::symmetry::{FnExpander, SymmetryExpander};
///
/// // a 1x3 strip that reads the same backwards
/// let mirror = FnExpander::new(|b: &[u8]| {
///     let mut rev = b.to_vec();
///     rev.reverse();
///     vec![b.to_vec(), rev]
/// });
/// assert_eq!(mirror.expand(&[1, 0, 2]), vec![vec![1, 0, 2], vec![2, 0, 1]]);
/// ```
#[derive(Clone, Copy)]
pub struct FnExpander<F> {
    f: F,
}

impl<F> FnExpander<F>
where
    F: Fn(&[Cell]) -> Vec<Board>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> SymmetryExpander for FnExpander<F>
where
    F: Fn(&[Cell]) -> Vec<Board>,
{
    fn expand(&self, board: &[Cell]) -> Vec<Board> {
        (self.f)(board)
    }
}

impl<F> std::fmt::Debug for FnExpander<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnExpander")
    }
}

/// What the engine needs from a game.
///
/// Rules, move generation and rendering stay with the game; the adapter
/// only turns a game state into a board vector and describes the board.
pub trait GameAdapter: SymmetryExpander {
    /// Game state type the adapter encodes.
    type State;

    /// Board dimensions and player count.
    fn geometry(&self) -> BoardGeometry;

    /// Encode `state` as a board vector of `geometry().num_cells` values.
    fn board_vector(&self, state: &Self::State) -> Board;
}
