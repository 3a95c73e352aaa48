//! Snapshot persistence tests.

use ntuple_td::core::{BoardGeometry, PlayerId};
use ntuple_td::error::{Error, SnapshotError};
use ntuple_td::learning::{NTupleValueFunction, Snapshot, TdConfig, SNAPSHOT_VERSION};
use ntuple_td::ntuple::{TcConfig, WeightInit};
use ntuple_td::symmetry::CellPermutations;

const TUPLES: [[usize; 4]; 3] = [[0, 1, 2, 3], [4, 5, 6, 7], [0, 5, 10, 15]];

fn trained(config: TdConfig) -> NTupleValueFunction {
    let tuples: Vec<Vec<usize>> = TUPLES.iter().map(|t| t.to_vec()).collect();
    let mut vf = NTupleValueFunction::new(
        &tuples,
        BoardGeometry::new(16, 3, 2),
        config,
        CellPermutations::square_dihedral(4),
    )
    .unwrap();

    let mut board = vec![0u8; 16];
    for step in 0..12 {
        let mut next = board.clone();
        next[(step * 7) % 16] = (step % 2 + 1) as u8;
        let player = PlayerId::new((step % 2) as u8);
        vf.update_weights(&board, player, &next, player, false, 0.0).unwrap();
        board = next;
    }
    vf.update_weights(&board, PlayerId::new(0), &[], PlayerId::new(0), true, 1.0)
        .unwrap();
    vf.finish_update_weights();
    vf
}

fn probe_boards() -> Vec<Vec<u8>> {
    (0..8u8)
        .map(|seed| (0..16u8).map(|i| (i * 5 + seed) % 3).collect())
        .collect()
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_round_trip_is_bit_exact() {
    let config = TdConfig::default()
        .with_lambda(0.5)
        .with_weight_init(WeightInit::Random { scale: 0.01 })
        .with_tc(TcConfig::default());
    let vf = trained(config);

    let bytes = vf.snapshot().to_bytes().unwrap();
    let restored =
        NTupleValueFunction::from_snapshot(Snapshot::from_bytes(&bytes).unwrap(), CellPermutations::square_dihedral(4))
            .unwrap();

    assert_eq!(restored.alpha(), vf.alpha());
    assert_eq!(restored.config(), vf.config());
    assert_eq!(restored.lut_summary(), vf.lut_summary());
    for board in probe_boards() {
        for player in PlayerId::all(2) {
            let a = vf.score(&board, player).unwrap();
            let b = restored.score(&board, player).unwrap();
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    // history is transient
    assert!(vf.history_len() > 0);
    assert_eq!(restored.history_len(), 0);
    assert_eq!(restored.horizon(), vf.horizon());
}

#[test]
fn test_restored_engine_learns_identically() {
    let mut vf = trained(TdConfig::default().with_tc(TcConfig::default().immediate()));
    let mut restored = NTupleValueFunction::from_snapshot(vf.snapshot(), CellPermutations::square_dihedral(4)).unwrap();
    vf.clear_equiv_list();

    let boards = probe_boards();
    let board = &boards[3];
    let p = PlayerId::new(1);
    let a = vf.update_weights(board, p, &[], p, true, -1.0).unwrap();
    let b = restored.update_weights(board, p, &[], p, true, -1.0).unwrap();

    assert_eq!(a, b);
    assert_eq!(vf.lut_summary(), restored.lut_summary());
}

#[test]
fn test_save_and_load_file() {
    let vf = trained(TdConfig::default());
    let path = std::env::temp_dir().join(format!("ntuple-td-{}.bin", std::process::id()));

    vf.save(&path).unwrap();
    let loaded = NTupleValueFunction::load(&path, CellPermutations::square_dihedral(4)).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.lut_hash_sum(), vf.lut_hash_sum());
    assert_eq!(loaded.network().sample_points(), vf.network().sample_points());
}

// =============================================================================
// Rejection
// =============================================================================

#[test]
fn test_version_mismatch_is_rejected() {
    let vf = trained(TdConfig::default());
    let mut bytes = vf.snapshot().to_bytes().unwrap();
    bytes[4..8].copy_from_slice(&99u32.to_le_bytes());

    match Snapshot::from_bytes(&bytes) {
        Err(SnapshotError::VersionMismatch { found, expected }) => {
            assert_eq!(found, 99);
            assert_eq!(expected, SNAPSHOT_VERSION);
        }
        other => panic!("expected version mismatch, got {other:?}"),
    }
}

#[test]
fn test_inconsistent_snapshot_is_rejected() {
    let vf = trained(TdConfig::default());
    let mut snapshot = vf.snapshot();
    snapshot.geometry.num_cells = 12;

    let result = NTupleValueFunction::from_snapshot(snapshot, CellPermutations::square_dihedral(4));
    assert!(matches!(result, Err(Error::Snapshot(SnapshotError::Corrupt(_)))));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = NTupleValueFunction::load(
        "/nonexistent/ntuple-td/snapshot.bin",
        CellPermutations::square_dihedral(4),
    );
    assert!(matches!(result, Err(Error::Snapshot(SnapshotError::Io(_)))));
}
