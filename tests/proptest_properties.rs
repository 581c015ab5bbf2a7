use proptest::prelude::*;

use romcal::bytediff::diff_bytes;
use romcal::naming::{FileKind, RomName, TuneTag};
use romcal::tables::{
    ByteOrder, DEFAULT_TOLERANCE, TableDefinition, diff_tables, extract,
};

fn grid_def(offset: usize, rows: usize, cols: usize, cell_width: usize) -> TableDefinition {
    TableDefinition {
        name: "grid".to_string(),
        offset,
        rows,
        cols,
        cell_width,
        byte_order: ByteOrder::Big,
        scale: 0.25,
        bias: -5.0,
        row_label: "RPM".to_string(),
        col_label: "Load".to_string(),
        row_axis: (0..rows).map(|i| i as f64).collect(),
        col_axis: (0..cols).map(|i| i as f64).collect(),
    }
}

proptest! {
    #[test]
    fn prop_name_roundtrip(
        owner in "[a-z][a-z0-9]{0,7}",
        car_year in 1000u16..=9999,
        car_model in "[a-z][a-z0-9]{0,7}",
        month in 1u8..=12,
        day in 1u8..=31,
        year in 1000u16..=9999,
        tune in proptest::option::of((0u16..=999, "[a-z0-9_]{1,12}")),
        interchange in any::<bool>(),
    ) {
        let meta = RomName {
            owner,
            car_year,
            car_model,
            month,
            day,
            year,
            tune: tune.map(|(sequence, description)| TuneTag { sequence, description }),
            kind: if interchange { FileKind::Interchange } else { FileKind::Binary },
        };
        let name = meta.file_name();
        let parsed = RomName::parse(&name).expect("formatted name must parse");
        prop_assert_eq!(parsed, meta);
    }

    #[test]
    fn prop_self_diff_is_empty(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let delta = diff_bytes(&data, &data, true).unwrap();
        prop_assert!(delta.is_identical());
        prop_assert!(delta.changes.is_empty());
        prop_assert!(delta.runs.is_empty());
    }

    #[test]
    fn prop_swapped_diff_preserves_offsets(
        pairs in proptest::collection::vec(any::<(u8, u8)>(), 0..4096)
    ) {
        let (a, b): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();
        let ab = diff_bytes(&a, &b, true).unwrap();
        let ba = diff_bytes(&b, &a, true).unwrap();

        let ab_offsets: Vec<usize> = ab.changes.iter().map(|c| c.offset).collect();
        let ba_offsets: Vec<usize> = ba.changes.iter().map(|c| c.offset).collect();
        prop_assert_eq!(ab_offsets, ba_offsets);
        prop_assert_eq!(ab.runs, ba.runs);
        for (x, y) in ab.changes.iter().zip(&ba.changes) {
            prop_assert_eq!(x.before, y.after);
            prop_assert_eq!(x.after, y.before);
        }
    }

    #[test]
    fn prop_diff_records_exactly_the_differing_offsets(
        pairs in proptest::collection::vec(any::<(u8, u8)>(), 0..2048)
    ) {
        let (a, b): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();
        let delta = diff_bytes(&a, &b, true).unwrap();

        let mut expected = Vec::new();
        for (i, (&x, &y)) in a.iter().zip(&b).enumerate() {
            if x != y {
                expected.push(i);
            }
        }
        let actual: Vec<usize> = delta.changes.iter().map(|c| c.offset).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_extraction_is_deterministic(
        image in proptest::collection::vec(any::<u8>(), 64..512),
        offset in 0usize..32,
        rows in 1usize..4,
        cols in 1usize..4,
    ) {
        let def = grid_def(offset, rows, cols, 2);
        let a = extract(&image, &def).unwrap();
        let b = extract(&image, &def).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_table_delta_is_exact_subtraction(
        pairs in proptest::collection::vec(any::<(u8, u8)>(), 16..64)
    ) {
        let (image_a, image_b): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();
        let def = grid_def(0, 4, 4, 1);
        let a = extract(&image_a, &def).unwrap();
        let b = extract(&image_b, &def).unwrap();
        let delta = diff_tables(&a, &b, DEFAULT_TOLERANCE).unwrap();

        for r in 0..4 {
            for c in 0..4 {
                let expected = b.values[r][c] - a.values[r][c];
                prop_assert!((delta.deltas[r][c] - expected).abs() < 1e-6);
            }
        }
    }
}
