// Column-oriented in-memory table

use crate::core::constants::TIME_COLUMN;
use crate::core::error::{ProfilerError, Result};
use crate::core::format::{ColumnName, LabelClass, MetaField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    /// Sensor readings and time; `None` marks a missing sample.
    Numeric(Vec<Option<f64>>),
    /// Activity label codes.
    Code(Vec<i64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Code(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filter(&self, mask: &[bool]) -> ColumnData {
        fn keep<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(v, _)| v.clone())
                .collect()
        }

        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(keep(v, mask)),
            ColumnData::Code(v) => ColumnData::Code(keep(v, mask)),
            ColumnData::Text(v) => ColumnData::Text(keep(v, mask)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: ColumnName,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: ColumnName, data: ColumnData) -> Self {
        Self { name, data }
    }
}

/// Ordered columns of equal length. Row order is temporal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);

        if let Some(bad) = columns.iter().find(|c| c.data.len() != rows) {
            return Err(ProfilerError::CorruptedData(format!(
                "column {} has {} rows, expected {}",
                bad.name,
                bad.data.len(),
                rows
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<ColumnName> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn column(&self, name: &ColumnName) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == *name)
    }

    pub fn contains(&self, name: &ColumnName) -> bool {
        self.column(name).is_some()
    }

    fn require(&self, name: &ColumnName) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| ProfilerError::ColumnNotFound(name.to_string()))
    }

    pub fn numeric(&self, name: &ColumnName) -> Result<&[Option<f64>]> {
        match &self.require(name)?.data {
            ColumnData::Numeric(v) => Ok(v),
            _ => Err(ProfilerError::CorruptedData(format!("column {} is not numeric", name))),
        }
    }

    pub fn time(&self) -> Result<&[Option<f64>]> {
        self.numeric(&ColumnName::Index(TIME_COLUMN))
    }

    pub fn codes(&self, class: LabelClass) -> Result<&[i64]> {
        let name = ColumnName::Label(class);
        match &self.require(&name)?.data {
            ColumnData::Code(v) => Ok(v),
            _ => Err(ProfilerError::CorruptedData(format!(
                "column {} is not a label column",
                name
            ))),
        }
    }

    pub fn text(&self, field: MetaField) -> Result<&[String]> {
        let name = ColumnName::Meta(field);
        match &self.require(&name)?.data {
            ColumnData::Text(v) => Ok(v),
            _ => Err(ProfilerError::CorruptedData(format!("column {} is not text", name))),
        }
    }

    /// Original indices of the numbered non-time columns, in column order.
    pub fn signal_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .filter_map(|c| match c.name {
                ColumnName::Index(i) if i != TIME_COLUMN => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Distinct values of a metadata column in order of first appearance.
    pub fn unique_text(&self, field: MetaField) -> Result<Vec<String>> {
        let mut seen = Vec::new();
        for value in self.text(field)? {
            if !seen.contains(value) {
                seen.push(value.clone());
            }
        }
        Ok(seen)
    }

    /// New table with exactly `names`, in that order.
    pub fn project(&self, names: &[ColumnName]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| self.require(name).cloned())
            .collect::<Result<Vec<_>>>()?;

        Ok(Table {
            columns,
            rows: self.rows,
        })
    }

    /// New table with the rows where `mask` is true, order preserved.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.rows {
            return Err(ProfilerError::LengthMismatch {
                time: self.rows,
                values: mask.len(),
            });
        }

        Ok(Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name, c.data.filter(mask)))
                .collect(),
            rows: mask.iter().filter(|m| **m).count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                ColumnName::Index(0),
                ColumnData::Numeric(vec![Some(0.0), Some(1.0), Some(2.0)]),
            ),
            Column::new(
                ColumnName::Index(1),
                ColumnData::Numeric(vec![Some(5.0), None, Some(7.0)]),
            ),
            Column::new(
                ColumnName::Label(LabelClass::Locomotion),
                ColumnData::Code(vec![1, 2, 1]),
            ),
            Column::new(
                ColumnName::Meta(MetaField::Pid),
                ColumnData::Text(vec!["1".into(), "2".into(), "1".into()]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::new(ColumnName::Index(0), ColumnData::Numeric(vec![Some(0.0)])),
            Column::new(ColumnName::Index(1), ColumnData::Numeric(vec![])),
        ]);
        assert!(matches!(result, Err(ProfilerError::CorruptedData(_))));
    }

    #[test]
    fn test_filter_rows_keeps_order() {
        let table = sample();
        let filtered = table.filter_rows(&[true, false, true]).unwrap();
        assert_eq!(filtered.n_rows(), 2);
        assert_eq!(filtered.time().unwrap(), &[Some(0.0), Some(2.0)]);
        assert_eq!(filtered.codes(LabelClass::Locomotion).unwrap(), &[1, 1]);
    }

    #[test]
    fn test_project_and_missing_column() {
        let table = sample();
        let projected = table.project(&[ColumnName::Index(1), ColumnName::Index(0)]).unwrap();
        assert_eq!(projected.column_names(), vec![ColumnName::Index(1), ColumnName::Index(0)]);
        assert!(matches!(
            table.project(&[ColumnName::Index(9)]),
            Err(ProfilerError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_unique_text_first_appearance() {
        assert_eq!(sample().unique_text(MetaField::Pid).unwrap(), vec!["1", "2"]);
        assert_eq!(sample().signal_indices(), vec![1]);
    }
}
