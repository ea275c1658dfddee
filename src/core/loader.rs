// Raw dataset loader: legends plus per-session .dat files -> CorpusStore

use crate::core::constants::NULL_LABEL_CODE;
use crate::core::error::{ProfilerError, Result};
use crate::core::format::*;
use crate::core::store::CorpusStore;
use crate::core::table::{Column, ColumnData, Table};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const COLUMN_LEGEND: &str = "column_names.txt";
pub const LABEL_LEGEND: &str = "label_legend.txt";
pub const SESSION_EXTENSION: &str = "dat";

/// Parse `Column: <n> <Sensor> <Location> <Signal>...` lines.
///
/// Lines with fewer fields (the time column, label columns) are skipped.
/// The result starts with the synthetic time row.
pub fn parse_column_names(text: &str) -> Vec<SignalMetadata> {
    let mut metadata = vec![SignalMetadata::time()];

    for line in text.lines() {
        let Some(rest) = line.trim().strip_prefix("Column:") else {
            continue;
        };
        let fields: Vec<&str> = rest.split_whitespace().collect();
        if fields.len() < 4 || fields[0].parse::<usize>().is_err() {
            continue;
        }

        // "accX;" -> "accX"
        let signal: String = fields[3].chars().take_while(|c| c.is_ascii_alphanumeric()).collect();
        if signal.is_empty() {
            continue;
        }

        metadata.push(SignalMetadata::new(fields[1], fields[2], &signal));
    }

    metadata
}

/// Parse `<code> - <Class> - <Label>` lines; headers and unknown classes
/// are skipped.
pub fn parse_label_legend(text: &str) -> Vec<ActivityLabel> {
    let mut labels = Vec::new();

    for line in text.lines() {
        let mut parts = line.trim().splitn(3, '-').map(str::trim);
        let (Some(code), Some(class), Some(label)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let Ok(code) = code.parse::<i64>() else {
            continue;
        };
        match class.parse::<LabelClass>() {
            Ok(class) if !label.is_empty() => labels.push(ActivityLabel::new(code, class, label)),
            Ok(_) => {}
            Err(e) => warn!("Label legend line skipped: {}", e),
        }
    }

    labels
}

/// `S1-ADL3.dat` -> (`1`, `ADL3`).
pub fn parse_session_name(file_name: &str) -> Result<(String, String)> {
    let bad = || ProfilerError::Parse(format!("unexpected session file name: {}", file_name));

    let rest = file_name.strip_prefix('S').ok_or_else(bad)?;
    let (pid, rest) = rest.split_once('-').ok_or_else(bad)?;
    let run: String = rest.chars().take_while(|c| c.is_ascii_alphanumeric()).collect();

    if pid.is_empty() || !pid.chars().all(|c| c.is_ascii_digit()) || run.is_empty() {
        return Err(bad());
    }
    Ok((pid.to_string(), run))
}

/// Column builders for the consolidated table.
struct TableBuilder {
    numbered: Vec<Vec<Option<f64>>>,
    labels: Vec<Vec<i64>>,
    files: Vec<String>,
    pids: Vec<String>,
    runs: Vec<String>,
}

impl TableBuilder {
    fn new(numbered: usize) -> Self {
        Self {
            numbered: vec![Vec::new(); numbered],
            labels: vec![Vec::new(); LabelClass::ALL.len()],
            files: Vec::new(),
            pids: Vec::new(),
            runs: Vec::new(),
        }
    }

    fn push_session(&mut self, text: &str, file_name: &str) -> Result<usize> {
        let (pid, run) = parse_session_name(file_name)?;
        let needed = self.numbered.len() + self.labels.len();
        let mut rows = 0;

        for (line_no, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < needed {
                return Err(ProfilerError::Parse(format!(
                    "{}:{}: expected {} fields, found {}",
                    file_name,
                    line_no + 1,
                    needed,
                    fields.len()
                )));
            }

            let parse = |field: &str| {
                field.parse::<f64>().map_err(|e| {
                    let at = format!("{}:{}", file_name, line_no + 1);
                    ProfilerError::Parse(format!("{}: {:?}: {}", at, field, e))
                })
            };

            for (column, field) in self.numbered.iter_mut().zip(&fields) {
                let value = parse(*field)?;
                column.push(if value.is_nan() { None } else { Some(value) });
            }
            for (column, field) in self.labels.iter_mut().zip(&fields[self.numbered.len()..]) {
                let value = parse(*field)?;
                column.push(if value.is_nan() { NULL_LABEL_CODE } else { value as i64 });
            }

            self.files.push(file_name.to_string());
            self.pids.push(pid.clone());
            self.runs.push(run.clone());
            rows += 1;
        }

        Ok(rows)
    }

    fn finish(self) -> Result<Table> {
        let mut columns: Vec<Column> = self
            .numbered
            .into_iter()
            .enumerate()
            .map(|(i, values)| Column::new(ColumnName::Index(i), ColumnData::Numeric(values)))
            .collect();

        columns.extend(
            LabelClass::ALL
                .into_iter()
                .zip(self.labels)
                .map(|(class, codes)| {
                    Column::new(ColumnName::Label(class), ColumnData::Code(codes))
                }),
        );

        columns.push(Column::new(ColumnName::Meta(MetaField::File), ColumnData::Text(self.files)));
        columns.push(Column::new(ColumnName::Meta(MetaField::Pid), ColumnData::Text(self.pids)));
        columns.push(Column::new(ColumnName::Meta(MetaField::RunId), ColumnData::Text(self.runs)));

        Table::new(columns)
    }
}

fn session_files(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            session_files(&path, found)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(SESSION_EXTENSION) {
            found.push(path);
        }
    }
    Ok(())
}

/// Build a [`CorpusStore`] from a dataset folder holding the two legend
/// files and any number of session files (searched recursively).
pub fn load_dataset<P: AsRef<Path>>(data_folder: P) -> Result<CorpusStore> {
    let dir = data_folder.as_ref();

    let metadata = parse_column_names(&fs::read_to_string(dir.join(COLUMN_LEGEND))?);
    let labels = parse_label_legend(&fs::read_to_string(dir.join(LABEL_LEGEND))?);
    info!(
        "Legends loaded: {} numbered columns, {} activity labels",
        metadata.len(),
        labels.len()
    );

    let mut files = Vec::new();
    session_files(dir, &mut files)?;
    files.sort();

    let mut builder = TableBuilder::new(metadata.len());
    for path in &files {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ProfilerError::Parse(format!("bad file name: {}", path.display())))?;
        let rows = builder.push_session(&fs::read_to_string(path)?, file_name)?;
        debug!("Session {}: {} rows", file_name, rows);
    }

    let store = CorpusStore::new(builder.finish()?, metadata, labels);
    store.check_alignment()?;

    info!(
        "Corpus loaded from {}: {} sessions, {} rows",
        dir.display(),
        files.len(),
        store.table.n_rows()
    );
    Ok(store)
}
