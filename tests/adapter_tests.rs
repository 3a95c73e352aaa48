//! Game adapter tests with a small tic-tac-toe encoding.

use ntuple_td::core::{Board, BoardGeometry, Cell, PlayerId};
use ntuple_td::learning::{NTupleValueFunction, TdConfig};
use ntuple_td::symmetry::{check_permutations, CellPermutations, GameAdapter, SymmetryExpander};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    X,
    O,
}

/// Tic-tac-toe position: row-major cells and the player to move.
#[derive(Clone, Debug, Default)]
struct Position {
    cells: [Option<Mark>; 9],
    moves: usize,
}

impl Position {
    fn play(&self, cell: usize) -> Self {
        let mut next = self.clone();
        next.cells[cell] = Some(if self.moves % 2 == 0 { Mark::X } else { Mark::O });
        next.moves += 1;
        next
    }

    fn to_move(&self) -> PlayerId {
        PlayerId::new((self.moves % 2) as u8)
    }

    fn winner(&self) -> Option<Mark> {
        const LINES: [[usize; 3]; 8] = [
            [0, 1, 2],
            [3, 4, 5],
            [6, 7, 8],
            [0, 3, 6],
            [1, 4, 7],
            [2, 5, 8],
            [0, 4, 8],
            [2, 4, 6],
        ];
        LINES.iter().find_map(|line| {
            let first = self.cells[line[0]]?;
            line.iter()
                .all(|&c| self.cells[c] == Some(first))
                .then_some(first)
        })
    }
}

struct TicTacToe {
    symmetries: CellPermutations,
}

impl TicTacToe {
    fn new() -> Self {
        Self {
            symmetries: CellPermutations::square_dihedral(3),
        }
    }
}

impl SymmetryExpander for TicTacToe {
    fn expand(&self, board: &[Cell]) -> Vec<Board> {
        self.symmetries.expand(board)
    }
}

impl GameAdapter for TicTacToe {
    type State = Position;

    fn geometry(&self) -> BoardGeometry {
        BoardGeometry::new(9, 3, 2)
    }

    fn board_vector(&self, state: &Position) -> Board {
        state
            .cells
            .iter()
            .map(|c| match c {
                None => 0,
                Some(Mark::X) => 1,
                Some(Mark::O) => 2,
            })
            .collect()
    }
}

fn tuples() -> Vec<Vec<usize>> {
    vec![vec![0, 1, 2, 3, 4, 5], vec![0, 1, 2, 4, 7, 8], vec![0, 4, 8, 2, 6, 3]]
}

#[test]
fn test_adapter_symmetries_are_permutations() {
    let adapter = TicTacToe::new();
    assert!(check_permutations(&adapter, adapter.geometry().num_cells).is_ok());
}

#[test]
fn test_engine_from_adapter_uses_its_geometry() {
    let vf = NTupleValueFunction::from_adapter(&tuples(), TicTacToe::new(), TdConfig::default()).unwrap();
    assert_eq!(*vf.geometry(), BoardGeometry::new(9, 3, 2));
    assert_eq!(vf.network().num_players(), 2);
    assert_eq!(vf.network().num_weights(), 2 * 3 * 729);
}

#[test]
fn test_training_episode_learns_the_win() {
    let adapter = TicTacToe::new();
    let mut vf = NTupleValueFunction::from_adapter(
        &tuples(),
        TicTacToe::new(),
        TdConfig::default().with_alpha(0.1).with_lambda(0.5),
    )
    .unwrap();

    // X wins along the top row
    let moves = [0, 4, 1, 8, 2];
    for _ in 0..20 {
        let mut position = Position::default();
        for &cell in &moves {
            let next = position.play(cell);
            let player = position.to_move();
            let finished = next.winner().is_some();
            let reward = if finished { 1.0 } else { 0.0 };
            vf.update_weights(
                &adapter.board_vector(&position),
                player,
                &adapter.board_vector(&next),
                player,
                finished,
                reward,
            )
            .unwrap();
            position = next;
        }
        assert_eq!(position.winner(), Some(Mark::X));
        vf.finish_update_weights();
        vf.clear_equiv_list();
    }

    let before_win = Position::default().play(0).play(4).play(1).play(8);
    let board = adapter.board_vector(&before_win);
    assert!(vf.score(&board, PlayerId::new(0)).unwrap() > 0.5);

    // the mirrored position is worth the same
    let mirrored = Position::default().play(2).play(4).play(1).play(6);
    let mirrored_board = adapter.board_vector(&mirrored);
    let diff = vf.score(&board, PlayerId::new(0)).unwrap()
        - vf.score(&mirrored_board, PlayerId::new(0)).unwrap();
    assert!(diff.abs() < 1e-12);
}
