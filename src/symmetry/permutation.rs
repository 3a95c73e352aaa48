//! Symmetries expressed as cell permutations.
//!
//! Most board symmetries (rotations, reflections) only move cells around.
//! A permutation `perm` maps a board to `out[i] = board[perm[i]]`.

use super::SymmetryExpander;
use crate::core::{Board, Cell};
use crate::error::ValidationError;

/// A fixed list of cell permutations, identity first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellPermutations {
    num_cells: usize,
    perms: Vec<Vec<usize>>,
}

impl CellPermutations {
    /// Build from explicit permutations.
    ///
    /// The first permutation must be the identity and every entry must be a
    /// permutation of `0..num_cells`.
    pub fn new(perms: Vec<Vec<usize>>) -> Result<Self, ValidationError> {
        let first = perms.first().ok_or(ValidationError::EmptyEquivalenceSet)?;
        let num_cells = first.len();
        if first.iter().enumerate().any(|(i, &p)| i != p) {
            return Err(ValidationError::EquivalenceFirstNotInput);
        }
        for (index, perm) in perms.iter().enumerate() {
            if !is_permutation(perm, num_cells) {
                return Err(ValidationError::NotAPermutation { index });
            }
        }
        Ok(Self { num_cells, perms })
    }

    /// The eight rotations and reflections of a `side` x `side` board in
    /// row-major order.
    #[must_use]
    pub fn square_dihedral(side: usize) -> Self {
        let last = side.saturating_sub(1);
        let maps: [fn(usize, usize, usize) -> (usize, usize); 8] = [
            |r, c, _| (r, c),
            |r, c, l| (l - c, r),
            |r, c, l| (l - r, l - c),
            |r, c, l| (c, l - r),
            |r, c, l| (r, l - c),
            |r, c, l| (l - r, c),
            |r, c, _| (c, r),
            |r, c, l| (l - c, l - r),
        ];
        let perms = maps
            .iter()
            .map(|map| {
                (0..side * side)
                    .map(|i| {
                        let (r, c) = map(i / side, i % side, last);
                        r * side + c
                    })
                    .collect()
            })
            .collect();
        Self {
            num_cells: side * side,
            perms,
        }
    }

    /// Identity plus the left-right mirror of a `rows` x `cols` board in
    /// row-major order (e.g. Connect-Four).
    #[must_use]
    pub fn mirror_columns(rows: usize, cols: usize) -> Self {
        let identity = (0..rows * cols).collect();
        let mirror = (0..rows * cols)
            .map(|i| (i / cols) * cols + (cols - 1 - i % cols))
            .collect();
        Self {
            num_cells: rows * cols,
            perms: vec![identity, mirror],
        }
    }

    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.perms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.perms.is_empty()
    }

    #[must_use]
    pub fn permutations(&self) -> &[Vec<usize>] {
        &self.perms
    }
}

impl SymmetryExpander for CellPermutations {
    fn expand(&self, board: &[Cell]) -> Vec<Board> {
        // A board of the wrong size cannot be permuted; hand it back alone
        // and let the engine's length check report it.
        if board.len() != self.num_cells {
            return vec![board.to_vec()];
        }
        self.perms
            .iter()
            .map(|perm| perm.iter().map(|&src| board[src]).collect())
            .collect()
    }
}

fn is_permutation(perm: &[usize], num_cells: usize) -> bool {
    if perm.len() != num_cells {
        return false;
    }
    let mut seen = vec![false; num_cells];
    for &p in perm {
        if p >= num_cells || std::mem::replace(&mut seen[p], true) {
            return false;
        }
    }
    true
}

/// Check that every symmetry of `expander` only moves cells around.
///
/// Marks one cell at a time with value 1 on an all-zero board and follows
/// where the mark lands in each equivalent board. Every equivalent board
/// must carry exactly one mark, and across all cells each symmetry must
/// hit every cell exactly once. Works for any board size.
pub fn check_permutations<S>(expander: &S, num_cells: usize) -> Result<(), ValidationError>
where
    S: SymmetryExpander + ?Sized,
{
    let mut images: Vec<Vec<usize>> = Vec::new();
    let mut board = vec![0; num_cells];

    for cell in 0..num_cells {
        board[cell] = 1;
        let equivalents = expander.expand(&board);
        board[cell] = 0;

        if equivalents.is_empty() {
            return Err(ValidationError::EmptyEquivalenceSet);
        }
        if equivalents[0] != board_with_mark(num_cells, cell) {
            return Err(ValidationError::EquivalenceFirstNotInput);
        }
        if images.is_empty() {
            images = vec![Vec::with_capacity(num_cells); equivalents.len()];
        } else if images.len() != equivalents.len() {
            return Err(ValidationError::NotAPermutation {
                index: images.len().min(equivalents.len()),
            });
        }

        for (index, equivalent) in equivalents.iter().enumerate() {
            if equivalent.len() != num_cells {
                return Err(ValidationError::EquivalenceLengthMismatch {
                    index,
                    expected: num_cells,
                    actual: equivalent.len(),
                });
            }
            let mut marks = equivalent.iter().enumerate().filter(|(_, &v)| v != 0);
            match (marks.next(), marks.next()) {
                (Some((target, &1)), None) => images[index].push(target),
                _ => return Err(ValidationError::NotAPermutation { index }),
            }
        }
    }

    for (index, image) in images.iter().enumerate() {
        if !is_permutation(image, num_cells) {
            return Err(ValidationError::NotAPermutation { index });
        }
    }
    Ok(())
}

fn board_with_mark(num_cells: usize, cell: usize) -> Board {
    let mut board = vec![0; num_cells];
    board[cell] = 1;
    board
}
