//! Property-based tests for the value function.

use proptest::prelude::*;

use ntuple_td::core::{BoardGeometry, PlayerId};
use ntuple_td::learning::{horizon_for, NTupleValueFunction, TdConfig};
use ntuple_td::ntuple::WeightInit;
use ntuple_td::symmetry::{CellPermutations, SymmetryExpander};

const SIDE: usize = 3;
const CELLS: usize = SIDE * SIDE;
const VALUES: u8 = 3;

fn engine(config: TdConfig) -> NTupleValueFunction {
    let tuples = vec![vec![0, 1, 2, 5], vec![3, 4, 5, 8], vec![0, 4, 8], vec![2, 4, 6, 7]];
    NTupleValueFunction::new(
        &tuples,
        BoardGeometry::new(CELLS, usize::from(VALUES), 2),
        config,
        CellPermutations::square_dihedral(SIDE),
    )
    .unwrap()
}

fn arb_board() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0..VALUES, CELLS)
}

fn arb_player() -> impl Strategy<Value = PlayerId> {
    (0..2u8).prop_map(PlayerId::new)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_sigmoid_output_is_bounded(
        board in arb_board(),
        player in arb_player(),
        scale in 0.0f64..50.0,
        seed in any::<u64>(),
    ) {
        let vf = engine(
            TdConfig::default()
                .with_weight_init(WeightInit::Random { scale })
                .with_seed(seed),
        );
        let score = vf.score(&board, player).unwrap();
        prop_assert!((-1.0..=1.0).contains(&score));
    }

    #[test]
    fn prop_score_is_pure(board in arb_board(), player in arb_player(), seed in any::<u64>()) {
        let vf = engine(
            TdConfig::default()
                .with_weight_init(WeightInit::Random { scale: 0.5 })
                .with_seed(seed),
        );
        let sums = vf.lut_summary();
        let first = vf.score(&board, player).unwrap();
        prop_assert_eq!(vf.score(&board, player).unwrap().to_bits(), first.to_bits());
        prop_assert_eq!(vf.lut_summary(), sums);
    }

    #[test]
    fn prop_equivalent_boards_score_alike(board in arb_board(), seed in any::<u64>()) {
        let vf = engine(
            TdConfig::default()
                .with_weight_init(WeightInit::Random { scale: 0.2 })
                .with_seed(seed),
        );
        let p = PlayerId::new(0);
        let reference = vf.score(&board, p).unwrap();
        for image in CellPermutations::square_dihedral(SIDE).expand(&board) {
            prop_assert!((vf.score(&image, p).unwrap() - reference).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_history_never_exceeds_horizon(
        lambda in 0.0f64..0.95,
        boards in prop::collection::vec(arb_board(), 1..30),
    ) {
        let mut vf = engine(TdConfig::default().with_lambda(lambda));
        let horizon = horizon_for(lambda).unwrap();
        prop_assert_eq!(vf.horizon(), horizon);

        let p = PlayerId::new(0);
        for pair in boards.windows(2) {
            vf.update_weights(&pair[0], p, &pair[1], p, false, 0.0).unwrap();
            prop_assert!(vf.history_len() <= horizon + 1);
        }
        prop_assert_eq!(vf.history_len(), (boards.len() - 1).min(horizon + 1));
    }

    #[test]
    fn prop_rejected_update_changes_nothing(
        board in arb_board(),
        bad_cell in 0..CELLS,
        bad_value in VALUES..=u8::MAX,
        lambda in 0.0f64..0.9,
    ) {
        let mut vf = engine(TdConfig::default().with_lambda(lambda));
        let p = PlayerId::new(1);
        vf.update_weights(&board, p, &[], p, true, 1.0).unwrap();
        let sums = vf.lut_summary();
        let history = vf.history_len();

        let mut bad = board.clone();
        bad[bad_cell] = bad_value;
        prop_assert!(vf.update_weights(&bad, p, &[], p, true, 1.0).is_err());
        prop_assert!(vf.update_weights(&board, p, &bad, p, false, 0.0).is_err());
        prop_assert!(vf.update_weights_terminal(&bad, p).is_err());

        prop_assert_eq!(vf.lut_summary(), sums);
        prop_assert_eq!(vf.history_len(), history);
    }
}
