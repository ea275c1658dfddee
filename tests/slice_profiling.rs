// End-to-end: carve slices through the public API and profile them

use opp_profiler::core::format::{ColumnName, MetaField};
use opp_profiler::core::table::{Column, ColumnData, Table};
use opp_profiler::{
    ActivityLabel, ColumnFilter, CorpusStore, DriverConfig, LabelClass, LabelFilter, ProfileKind,
    ProfilingDriver, RunFilter, SelectionView, SignalMetadata, SignalSeries,
};
use std::sync::Arc;

/// Two subjects, one run each, alternating Stand / Walk blocks of 20 rows.
fn corpus() -> Arc<CorpusStore> {
    let rows = 80;
    let time: Vec<Option<f64>> = (0..rows).map(|i| Some(i as f64 * 33.0)).collect();
    let locomotion: Vec<i64> = (0..rows).map(|i| if (i / 20) % 2 == 0 { 1 } else { 2 }).collect();

    // walking swings wider than standing
    let acc: Vec<Option<f64>> = (0..rows)
        .map(|i| {
            let amplitude = if locomotion[i] == 2 { 400.0 } else { 20.0 };
            Some(1000.0 + amplitude * ((i as f64) * 0.7).sin())
        })
        .collect();
    let mut gyro: Vec<Option<f64>> = (0..rows).map(|i| Some((i % 7) as f64)).collect();
    gyro[3] = None;

    let mut columns = vec![
        Column::new(ColumnName::Index(0), ColumnData::Numeric(time)),
        Column::new(ColumnName::Index(1), ColumnData::Numeric(acc)),
        Column::new(ColumnName::Index(2), ColumnData::Numeric(gyro)),
    ];
    for class in LabelClass::ALL {
        let codes = if class == LabelClass::Locomotion {
            locomotion.clone()
        } else {
            vec![0; rows]
        };
        columns.push(Column::new(ColumnName::Label(class), ColumnData::Code(codes)));
    }
    let pid: Vec<String> = (0..rows).map(|i| if i < 40 { "1" } else { "2" }.to_string()).collect();
    let file: Vec<String> = pid.iter().map(|p| format!("S{}-ADL1.dat", p)).collect();
    columns.push(Column::new(ColumnName::Meta(MetaField::File), ColumnData::Text(file)));
    columns.push(Column::new(ColumnName::Meta(MetaField::Pid), ColumnData::Text(pid)));
    columns.push(Column::new(
        ColumnName::Meta(MetaField::RunId),
        ColumnData::Text(vec!["ADL1".to_string(); rows]),
    ));

    let store = CorpusStore::new(
        Table::new(columns).unwrap(),
        vec![
            SignalMetadata::time(),
            SignalMetadata::new("InertialMeasurementUnit", "BACK", "accX"),
            SignalMetadata::new("InertialMeasurementUnit", "BACK", "gyroX"),
        ],
        vec![
            ActivityLabel::new(1, LabelClass::Locomotion, "Stand"),
            ActivityLabel::new(2, LabelClass::Locomotion, "Walk"),
        ],
    );
    store.check_alignment().unwrap();
    Arc::new(store)
}

#[test]
fn walking_and_standing_profiles_differ() {
    let mut view = SelectionView::new(corpus());
    view.apply_run_selection(&RunFilter::new().pid("1")).unwrap();
    view.apply_column_selection(&ColumnFilter::new().signal("accX")).unwrap();

    let mut series = Vec::new();
    for activity in ["Stand", "Walk"] {
        view.apply_label_selection(&LabelFilter::new().with("Locomotion", activity)).unwrap();
        let columns = view.signal_columns().unwrap();
        assert_eq!(columns.len(), 1);
        series.push(SignalSeries::build(view.time_column().unwrap(), columns[0].2).unwrap());
        view.undo();
    }

    assert_eq!(series[0].len(), 20);
    assert_eq!(series[1].len(), 20);
    assert!(series[1].range() > series[0].range());

    let raw = ProfileKind::Raw;
    let distance = series[0].profile(raw).compare(series[1].profile(raw)).unwrap();
    assert!(distance > 0.5, "distance {}", distance);
    assert_eq!(distance, series[1].profile(raw).compare(series[0].profile(raw)).unwrap());
}

#[test]
fn restart_after_many_selections() {
    let store = corpus();
    let mut view = SelectionView::new(Arc::clone(&store));

    view.apply_run_selection(&RunFilter::new().pid("2")).unwrap();
    view.apply_label_selection(&LabelFilter::new().with("Locomotion", "Walk")).unwrap();
    view.apply_column_selection(&ColumnFilter::new().signal("gyroX")).unwrap();
    assert_eq!(view.current().n_rows(), 20);

    view.restart();
    assert_eq!(view.current(), store.table.as_ref());
}

#[test]
fn driver_covers_every_subject_and_activity() {
    let index = ProfilingDriver::new(corpus(), DriverConfig::default()).run().unwrap();

    assert!(index.gaps.is_empty());
    assert_eq!(index.len(), 2 * 2 * 2);
    for pid in ["1", "2"] {
        for activity in ["Stand", "Walk"] {
            let profile = index
                .get(pid, "ADL1", activity, "InertialMeasurementUnit BACK accX")
                .unwrap();
            assert_eq!(profile.samples, 20);
            assert!((profile.profile.integral() - 1.0).abs() < 1e-9);
        }
    }

    // one missing gyro sample in subject 1's first Stand block
    let gyro = index.get("1", "ADL1", "Stand", "InertialMeasurementUnit BACK gyroX").unwrap();
    assert_eq!(gyro.samples, 19);
}
