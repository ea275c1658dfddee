// Example: load the raw dataset, carve one slice and compare two activities

use opp_profiler::core::loader::load_dataset;
use opp_profiler::{
    ColumnFilter, LabelFilter, ProfileKind, Result, RunFilter, SelectionView, SignalSeries,
};
use std::sync::Arc;
use tracing::{info, warn, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let data_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/OpportunityUCIDataset/dataset".to_string());

    let store = Arc::new(load_dataset(&data_dir)?);
    let mut view = SelectionView::new(Arc::clone(&store));

    // Back accelerometer of subject 1, first daily-living run
    view.apply_run_selection(&RunFilter::new().pid("1").run_id("ADL1"))?;
    view.apply_column_selection(
        &ColumnFilter::new()
            .sensor("InertialMeasurementUnit")
            .location("BACK")
            .signal(["accX", "accY", "accZ"]),
    )?;
    info!("Slice: {} rows, {} columns", view.current().n_rows(), view.columns().len());

    let mut per_activity = Vec::new();
    for activity in ["Stand", "Walk"] {
        view.apply_label_selection(&LabelFilter::new().with("Locomotion", activity))?;

        let time = view.time_column()?;
        for (index, meta, values) in view.signal_columns()? {
            match SignalSeries::build(time, values) {
                Ok(series) => {
                    let raw = series.select_view(false, false);
                    info!(
                        "{} [{}] {}: {} samples, range {:.1}, {} bins",
                        activity,
                        index,
                        meta.display_name(),
                        series.len(),
                        series.range(),
                        raw.profile.bin_count()
                    );
                    per_activity.push((activity, index, series));
                }
                Err(e) => warn!("{} [{}]: {}", activity, index, e),
            }
        }

        // back to the run/column slice for the next activity
        view.undo();
    }

    for (_, index, stand) in per_activity.iter().filter(|(a, _, _)| *a == "Stand") {
        let walk = per_activity
            .iter()
            .find(|(a, i, _)| *a == "Walk" && i == index);

        if let Some((_, _, walk)) = walk {
            let kind = ProfileKind::Normalized;
            let distance = stand.profile(kind).compare(walk.profile(kind))?;
            info!("Column {}: Stand vs Walk normalized overlap distance {:.3}", index, distance);
        }
    }

    Ok(())
}
