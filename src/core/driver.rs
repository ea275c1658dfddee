// Profiling driver: subjects x runs x activities x signals

use crate::core::constants::NULL_LABEL_CODE;
use crate::core::density::{DensityProfile, ProfileKind};
use crate::core::error::{ProfilerError, Result};
use crate::core::filter::{ColumnFilter, LabelFilter, RunFilter};
use crate::core::format::{ActivityLabel, LabelClass, MetaField};
use crate::core::series::SignalSeries;
use crate::core::store::CorpusStore;
use crate::core::view::SelectionView;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Annotation axis whose labels define the activities.
    pub label_class: LabelClass,
    /// Leave out the dataset's "no annotation" code.
    pub skip_null_label: bool,
    pub kind: ProfileKind,
    /// Applied to every slice after the row selections.
    pub columns: Option<ColumnFilter>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            label_class: LabelClass::Locomotion,
            skip_null_label: true,
            kind: ProfileKind::Raw,
            columns: None,
        }
    }
}

/// Summary of one signal column within one slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceProfile {
    pub column: usize,
    pub samples: usize,
    pub min: f64,
    pub max: f64,
    pub profile: DensityProfile,
}

impl SliceProfile {
    pub fn from_series(column: usize, series: &SignalSeries, kind: ProfileKind) -> Self {
        let (normalized, gradient) = kind.flags();
        let view = series.select_view(normalized, gradient);
        let (min, max) = view
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Self {
            column,
            samples: view.values.len(),
            min,
            max,
            profile: view.profile.clone(),
        }
    }
}

/// A slice that could not be profiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileGap {
    pub pid: String,
    pub run: String,
    pub activity: String,
    pub signal: String,
    pub reason: String,
}

pub type SignalProfiles = BTreeMap<String, SliceProfile>;

/// `{pid: {run: {activity: {signal: profile}}}}` plus the recorded gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileIndex {
    pub kind: ProfileKind,
    pub profiles: BTreeMap<String, BTreeMap<String, BTreeMap<String, SignalProfiles>>>,
    pub gaps: Vec<ProfileGap>,
}

impl ProfileIndex {
    pub fn get(&self, pid: &str, run: &str, activity: &str, signal: &str) -> Option<&SliceProfile> {
        self.profiles.get(pid)?.get(run)?.get(activity)?.get(signal)
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles
            .values()
            .flat_map(|runs| runs.values())
            .flat_map(|activities| activities.values())
            .map(|signals| signals.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(
        &mut self,
        pid: &str,
        run: &str,
        activity: &str,
        signal: String,
        profile: SliceProfile,
    ) {
        let signals = self
            .profiles
            .entry(pid.to_string())
            .or_default()
            .entry(run.to_string())
            .or_default()
            .entry(activity.to_string())
            .or_default();

        let key = if signals.contains_key(&signal) {
            format!("{} #{}", signal, profile.column)
        } else {
            signal
        };
        signals.insert(key, profile);
    }
}

/// Profile every signal column of the view's current slice.
///
/// Failures are returned per column so the caller decides what to skip.
pub fn profile_slice(
    view: &SelectionView,
    kind: ProfileKind,
) -> Result<Vec<(String, Result<SliceProfile>)>> {
    let time = view.time_column()?;

    Ok(view
        .signal_columns()?
        .into_iter()
        .map(|(column, meta, values)| {
            let outcome = SignalSeries::build(time, values)
                .map(|series| SliceProfile::from_series(column, &series, kind));
            (meta.display_name(), outcome)
        })
        .collect())
}

pub struct ProfilingDriver {
    store: Arc<CorpusStore>,
    config: DriverConfig,
}

impl ProfilingDriver {
    pub fn new(store: Arc<CorpusStore>, config: DriverConfig) -> Self {
        Self { store, config }
    }

    fn activities(&self) -> Vec<&ActivityLabel> {
        self.store
            .labels_for(self.config.label_class)
            .filter(|l| !(self.config.skip_null_label && l.code == NULL_LABEL_CODE))
            .collect()
    }

    /// Walk every (subject, run, activity) slice.
    ///
    /// A signal that cannot be profiled becomes a [`ProfileGap`]; selection
    /// errors abort the whole run.
    pub fn run(&self) -> Result<ProfileIndex> {
        let pids = self.store.table.unique_text(MetaField::Pid)?;
        let runs = self.store.table.unique_text(MetaField::RunId)?;
        let activities = self.activities();
        let class = self.config.label_class.as_str();

        info!(
            "Profiling {} subjects x {} runs x {} {} activities",
            pids.len(),
            runs.len(),
            activities.len(),
            class
        );

        let mut view = SelectionView::new(Arc::clone(&self.store));
        let mut index = ProfileIndex {
            kind: self.config.kind,
            ..ProfileIndex::default()
        };

        for pid in &pids {
            for run in &runs {
                for activity in &activities {
                    view.restart();
                    let run_filter = RunFilter::new().pid(pid.as_str()).run_id(run.as_str());
                    let label_filter = LabelFilter::new().with(class, activity.label.as_str());
                    view.apply_run_selection(&run_filter)?;
                    view.apply_label_selection(&label_filter)?;
                    if let Some(columns) = &self.config.columns {
                        view.apply_column_selection(columns)?;
                    }

                    if view.current().is_empty() {
                        debug!("Empty slice: PID {} run {} {}", pid, run, activity.label);
                        continue;
                    }

                    for (signal, outcome) in profile_slice(&view, self.config.kind)? {
                        match outcome {
                            Ok(profile) => index.insert(pid, run, &activity.label, signal, profile),
                            Err(e) => {
                                warn!(
                                    "Skipping PID {} run {} {} / {}: {}",
                                    pid, run, activity.label, signal, e
                                );
                                index.gaps.push(gap(pid, run, &activity.label, signal, &e));
                            }
                        }
                    }
                }
            }
        }

        view.restart();
        info!("Profiling done: {} profiles, {} gaps", index.len(), index.gaps.len());
        Ok(index)
    }
}

fn gap(pid: &str, run: &str, activity: &str, signal: String, error: &ProfilerError) -> ProfileGap {
    ProfileGap {
        pid: pid.to_string(),
        run: run.to_string(),
        activity: activity.to_string(),
        signal,
        reason: error.to_string(),
    }
}
