// Small hand-built corpora shared by unit tests

use crate::core::format::*;
use crate::core::store::CorpusStore;
use crate::core::table::{Column, ColumnData, Table};
use std::sync::Arc;

pub(crate) const ACC_BACK: usize = 1;
pub(crate) const ACC_ARM: usize = 2;
pub(crate) const GYRO_BACK: usize = 3;

fn text(values: &[&str]) -> ColumnData {
    ColumnData::Text(values.iter().map(|s| s.to_string()).collect())
}

fn numeric(values: &[f64]) -> ColumnData {
    ColumnData::Numeric(values.iter().copied().map(Some).collect())
}

/// Five rows, three signal columns.
///
/// Locomotion is `[1, 1, 2, 2, 1]` (Stand, Stand, Walk, Walk, Stand) and
/// HL_Activity marks only row 3 as Coffee, so no row is both Stand and
/// Coffee.
pub(crate) fn five_row_store() -> Arc<CorpusStore> {
    let mut columns = vec![
        Column::new(ColumnName::Index(0), numeric(&[0.0, 33.0, 66.0, 100.0, 133.0])),
        Column::new(ColumnName::Index(ACC_BACK), numeric(&[10.0, 12.0, 30.0, 34.0, 11.0])),
        Column::new(ColumnName::Index(ACC_ARM), numeric(&[-1.0, -2.0, 5.0, 6.0, -1.5])),
        Column::new(ColumnName::Index(GYRO_BACK), numeric(&[0.1, 0.2, 0.9, 1.1, 0.15])),
    ];

    for class in LabelClass::ALL {
        let codes = match class {
            LabelClass::Locomotion => vec![1, 1, 2, 2, 1],
            LabelClass::HlActivity => vec![0, 0, 0, 5, 0],
            _ => vec![0; 5],
        };
        columns.push(Column::new(ColumnName::Label(class), ColumnData::Code(codes)));
    }

    columns.push(Column::new(
        ColumnName::Meta(MetaField::File),
        text(&["S1-ADL1.dat", "S1-ADL1.dat", "S1-Drill.dat", "S2-ADL1.dat", "S2-ADL1.dat"]),
    ));
    columns.push(Column::new(ColumnName::Meta(MetaField::Pid), text(&["1", "1", "1", "2", "2"])));
    columns.push(Column::new(
        ColumnName::Meta(MetaField::RunId),
        text(&["ADL1", "ADL1", "Drill", "ADL1", "ADL1"]),
    ));

    let metadata = vec![
        SignalMetadata::time(),
        SignalMetadata::new("InertialMeasurementUnit", "BACK", "acc"),
        SignalMetadata::new("InertialMeasurementUnit", "ARM", "acc"),
        SignalMetadata::new("InertialMeasurementUnit", "BACK", "gyro"),
    ];

    let labels = vec![
        ActivityLabel::new(1, LabelClass::Locomotion, "Stand"),
        ActivityLabel::new(2, LabelClass::Locomotion, "Walk"),
        ActivityLabel::new(5, LabelClass::HlActivity, "Coffee"),
        ActivityLabel::new(1, LabelClass::LlLeftArm, "Stand"),
    ];

    Arc::new(CorpusStore::new(
        Table::new(columns).expect("fixture columns have equal length"),
        metadata,
        labels,
    ))
}
