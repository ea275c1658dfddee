// Consolidated corpus: the table plus its two side-tables

use crate::core::error::{ProfilerError, Result};
use crate::core::format::{ActivityLabel, LabelClass, SignalMetadata};
use crate::core::table::Table;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Read-only once built. Share it behind an `Arc` and give each caller its
/// own [`SelectionView`](crate::core::view::SelectionView).
///
/// Precondition: numbered column `i` of `table` is described by
/// `signal_metadata[i]`. [`CorpusStore::new`] trusts this; call
/// [`CorpusStore::check_alignment`] when the source is not trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStore {
    pub table: Arc<Table>,
    pub signal_metadata: Vec<SignalMetadata>,
    pub activity_labels: Vec<ActivityLabel>,
}

impl CorpusStore {
    pub fn new(
        table: Table,
        signal_metadata: Vec<SignalMetadata>,
        activity_labels: Vec<ActivityLabel>,
    ) -> Self {
        Self {
            table: Arc::new(table),
            signal_metadata,
            activity_labels,
        }
    }

    pub fn check_alignment(&self) -> Result<()> {
        // time column included on both sides
        let numbered = self.table.signal_indices().len() + 1;
        if numbered != self.signal_metadata.len() {
            return Err(ProfilerError::MisalignedMetadata {
                metadata: self.signal_metadata.len(),
                table: numbered,
            });
        }
        Ok(())
    }

    pub fn labels_for(&self, class: LabelClass) -> impl Iterator<Item = &ActivityLabel> {
        self.activity_labels.iter().filter(move |l| l.class == class)
    }

    pub fn label_for_code(&self, class: LabelClass, code: i64) -> Option<&ActivityLabel> {
        self.labels_for(class).find(|l| l.code == code)
    }
}
