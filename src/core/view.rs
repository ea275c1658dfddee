// Selection view: the query engine over a CorpusStore
//
// State lives in two named slots, `current` and `previous`. Every
// selection moves `current` into `previous` and narrows a copy; `undo`
// and `restart` only swap snapshots. Snapshots share data through `Arc`,
// so keeping history is cheap.

use crate::core::constants::TIME_COLUMN;
use crate::core::error::{ProfilerError, Result};
use crate::core::filter::{ColumnFilter, LabelFilter, RunFilter};
use crate::core::format::*;
use crate::core::store::CorpusStore;
use crate::core::table::Table;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Selected metadata rows keyed by original column index.
pub type ColumnMap = BTreeMap<usize, SignalMetadata>;

/// A table together with the metadata rows of its selected columns.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: Arc<Table>,
    pub columns: Arc<ColumnMap>,
}

impl Snapshot {
    fn base(store: &CorpusStore) -> Self {
        Self {
            table: Arc::clone(&store.table),
            columns: Arc::new(store.signal_metadata.iter().cloned().enumerate().collect()),
        }
    }
}

/// Pick the metadata rows matching `filter`.
///
/// Conjunction across attributes, disjunction within an attribute's value
/// set. An empty filter keeps every row. A non-empty filter without a
/// single recognized attribute is rejected with `InvalidFilterKey`.
pub fn resolve_columns(metadata: &[SignalMetadata], filter: &ColumnFilter) -> Result<ColumnMap> {
    let constraints = filter.constraints();

    if constraints.is_empty() && !filter.unrecognized.is_empty() {
        let keys: Vec<String> = filter.unrecognized.keys().cloned().collect();
        warn!("Column filter has no recognized key: {:?}", keys);
        return Err(ProfilerError::InvalidFilterKey(keys));
    }

    if !filter.unrecognized.is_empty() {
        debug!("Ignoring column filter keys: {:?}", filter.unrecognized.keys());
    }

    Ok(metadata
        .iter()
        .enumerate()
        .filter(|(_, meta)| {
            constraints.iter().all(|(key, accepted)| {
                meta.attribute(key).map_or(false, |value| accepted.contains(value))
            })
        })
        .map(|(index, meta)| (index, meta.clone()))
        .collect())
}

/// Legend records matching `filter`, in filter order.
///
/// Unknown classes and unknown labels contribute nothing.
pub fn resolve_label_rows(labels: &[ActivityLabel], filter: &LabelFilter) -> Vec<ActivityLabel> {
    let mut records = Vec::new();

    for (key, accepted) in filter.iter() {
        let class = match key.parse::<LabelClass>() {
            Ok(class) => class,
            Err(e) => {
                debug!("{}", e);
                continue;
            }
        };

        records.extend(
            labels
                .iter()
                .filter(|l| l.class == class && accepted.contains(&l.label))
                .cloned(),
        );
    }

    records
}

/// Two-slot history. Transitions return the next state.
#[derive(Debug, Clone)]
pub struct ViewState {
    current: Snapshot,
    previous: Snapshot,
}

impl ViewState {
    pub fn new(base: Snapshot) -> Self {
        Self {
            current: base.clone(),
            previous: base,
        }
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }

    fn advance(&self, next: Snapshot) -> ViewState {
        ViewState {
            current: next,
            previous: self.current.clone(),
        }
    }

    pub fn select_columns(
        &self,
        metadata: &[SignalMetadata],
        filter: &ColumnFilter,
    ) -> Result<ViewState> {
        let resolved = resolve_columns(metadata, filter)?;
        let table = &self.current.table;

        let mut names = vec![ColumnName::Index(TIME_COLUMN)];
        let mut kept = ColumnMap::new();

        for (index, meta) in resolved {
            if index != TIME_COLUMN {
                let name = ColumnName::Index(index);
                if !table.contains(&name) {
                    debug!("Column {} already projected away, skipping", index);
                    continue;
                }
                names.push(name);
            }
            kept.insert(index, meta);
        }

        debug!("Column selection kept {} signal columns", names.len() - 1);
        names.extend(LabelClass::ALL.map(ColumnName::Label));
        names.extend(MetaField::ALL.map(ColumnName::Meta));

        let projected = table.project(&names)?;

        Ok(self.advance(Snapshot {
            table: Arc::new(projected),
            columns: Arc::new(kept),
        }))
    }

    pub fn select_labels(
        &self,
        labels: &[ActivityLabel],
        filter: &LabelFilter,
    ) -> Result<ViewState> {
        let records = resolve_label_rows(labels, filter);
        let table = &self.current.table;

        let mut valid: BTreeMap<LabelClass, BTreeSet<i64>> = BTreeMap::new();
        for record in &records {
            valid.entry(record.class).or_default().insert(record.code);
        }

        // a row passes when it matches any requested class
        let mut mask = vec![false; table.n_rows()];
        for (class, codes) in &valid {
            for (keep, code) in mask.iter_mut().zip(table.codes(*class)?) {
                *keep |= codes.contains(code);
            }
        }

        let filtered = table.filter_rows(&mask)?;
        debug!(
            "Label selection matched {} legend records, {} of {} rows",
            records.len(),
            filtered.n_rows(),
            table.n_rows()
        );

        Ok(self.advance(Snapshot {
            table: Arc::new(filtered),
            columns: Arc::clone(&self.current.columns),
        }))
    }

    /// Each PID value narrows the table in turn, then each RunID value.
    ///
    /// Several values for one key therefore intersect: two distinct PIDs
    /// leave no rows. History is untouched when neither key has a value.
    pub fn select_runs(&self, filter: &RunFilter) -> Result<ViewState> {
        let pids: Vec<&str> = filter.pid.iter().flat_map(|v| v.iter()).collect();
        let runs: Vec<&str> = filter.run_id.iter().flat_map(|v| v.iter()).collect();

        if pids.is_empty() && runs.is_empty() {
            return Ok(self.clone());
        }

        if pids.len() > 1 || runs.len() > 1 {
            warn!(
                "Run selection with several values narrows sequentially (PID {:?}, RunID {:?})",
                pids, runs
            );
        }

        let mut table = Arc::clone(&self.current.table);
        let steps = pids
            .iter()
            .map(|v| (MetaField::Pid, *v))
            .chain(runs.iter().map(|v| (MetaField::RunId, *v)));

        for (field, value) in steps {
            let mask: Vec<bool> = table.text(field)?.iter().map(|cell| cell == value).collect();
            table = Arc::new(table.filter_rows(&mask)?);
        }

        Ok(self.advance(Snapshot {
            table,
            columns: Arc::clone(&self.current.columns),
        }))
    }

    pub fn undo(&self) -> ViewState {
        ViewState {
            current: self.previous.clone(),
            previous: self.previous.clone(),
        }
    }

    pub fn restart(&self, base: &Snapshot) -> ViewState {
        ViewState {
            current: base.clone(),
            previous: self.previous.clone(),
        }
    }
}

/// Stateful cursor over a shared [`CorpusStore`].
///
/// One view per caller: the undo slot is not isolated between callers.
#[derive(Debug, Clone)]
pub struct SelectionView {
    store: Arc<CorpusStore>,
    base: Snapshot,
    state: ViewState,
}

impl SelectionView {
    pub fn new(store: Arc<CorpusStore>) -> Self {
        let base = Snapshot::base(&store);
        Self {
            state: ViewState::new(base.clone()),
            base,
            store,
        }
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn current(&self) -> &Table {
        &self.state.current.table
    }

    pub fn previous(&self) -> &Table {
        &self.state.previous.table
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.state.current.columns
    }

    pub fn resolve_columns(&self, filter: &ColumnFilter) -> Result<ColumnMap> {
        resolve_columns(&self.store.signal_metadata, filter)
    }

    pub fn resolve_label_rows(&self, filter: &LabelFilter) -> Vec<ActivityLabel> {
        resolve_label_rows(&self.store.activity_labels, filter)
    }

    pub fn apply_column_selection(&mut self, filter: &ColumnFilter) -> Result<()> {
        self.state = self.state.select_columns(&self.store.signal_metadata, filter)?;
        Ok(())
    }

    pub fn apply_label_selection(&mut self, filter: &LabelFilter) -> Result<()> {
        self.state = self.state.select_labels(&self.store.activity_labels, filter)?;
        Ok(())
    }

    pub fn apply_run_selection(&mut self, filter: &RunFilter) -> Result<()> {
        self.state = self.state.select_runs(filter)?;
        Ok(())
    }

    pub fn undo(&mut self) {
        self.state = self.state.undo();
    }

    pub fn restart(&mut self) {
        self.state = self.state.restart(&self.base);
    }

    pub fn time_column(&self) -> Result<&[Option<f64>]> {
        self.current().time()
    }

    /// Signal columns of the current slice with their metadata.
    pub fn signal_columns(&self) -> Result<Vec<(usize, &SignalMetadata, &[Option<f64>])>> {
        let table = self.current();
        table
            .signal_indices()
            .into_iter()
            .map(|index| {
                let meta = self
                    .store
                    .signal_metadata
                    .get(index)
                    .ok_or_else(|| {
                        ProfilerError::ColumnNotFound(format!("metadata row {}", index))
                    })?;
                Ok((index, meta, table.numeric(&ColumnName::Index(index))?))
            })
            .collect()
    }
}
