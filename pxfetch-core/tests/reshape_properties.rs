//! Property tests for the export reshape.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use pxfetch_core::data::frame::{ADJ_CLOSE, CLOSE, DIVIDENDS, STOCK_SPLITS, VOLUME};
use pxfetch_core::data::{history_frame, reshape_for_export, RawBar, EXPORT_COLUMNS};

fn arb_bars() -> impl Strategy<Value = Vec<RawBar>> {
    prop::collection::vec(
        (
            1.0f64..10_000.0,
            0u64..10_000_000_000,
            prop_oneof![Just(0.0), 0.01f64..5.0],
            prop_oneof![Just(0.0), Just(2.0), Just(0.5)],
        ),
        1..60,
    )
    .prop_map(|rows| {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (close, volume, dividends, stock_splits))| RawBar {
                date: start + Days::new(i as u64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume,
                dividends,
                stock_splits,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn reshape_invariants_hold(bars in arb_bars()) {
        let df = reshape_for_export(history_frame(&bars).unwrap()).unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        prop_assert_eq!(names, EXPORT_COLUMNS.to_vec());
        prop_assert!(df.column(DIVIDENDS).is_err());
        prop_assert!(df.column(STOCK_SPLITS).is_err());
        prop_assert_eq!(df.height(), bars.len());

        let volume: Vec<u64> = df.column(VOLUME).unwrap().u64().unwrap().into_no_null_iter().collect();
        let expected: Vec<u64> = bars.iter().map(|b| b.volume).collect();
        prop_assert_eq!(volume, expected);

        let close: Vec<f64> = df.column(CLOSE).unwrap().f64().unwrap().into_no_null_iter().collect();
        let adj: Vec<f64> = df.column(ADJ_CLOSE).unwrap().f64().unwrap().into_no_null_iter().collect();
        prop_assert_eq!(close, adj);
    }
}
