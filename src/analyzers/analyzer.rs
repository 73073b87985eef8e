use crate::analyzers::store::AggregationStore;
use crate::analyzers::types::MonthIndex;
use crate::config::PipelineConfig;
use crate::locations::LocationIndex;
use crate::output::export_all;
use crate::parser::{Category, RawRow, for_each_row, parse_row};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Runs the whole batch: loads the pincode directory, aggregates every
/// category's CSVs, then writes one JSON document per month.
pub fn run(config: &PipelineConfig) -> Result<MonthIndex> {
    info!(path = %config.pincode_file.display(), "Loading pincode directory");
    let locations = LocationIndex::load(&config.pincode_file)?;

    let mut store = AggregationStore::new();
    for category in Category::ALL {
        process_category(&mut store, category, config.category_dir(category))?;
    }

    info!(
        months = store.month_count(),
        records = store.record_count(),
        "Aggregation finished"
    );

    let index = export_all(&store, &locations, &config.output_dir)?;

    info!(output_dir = %config.output_dir.display(), "Processing complete");
    Ok(index)
}

/// Merges every CSV file of `dir` into `store`.
///
/// A missing directory is logged and contributes nothing.
pub fn process_category(
    store: &mut AggregationStore,
    category: Category,
    dir: &Path,
) -> Result<()> {
    if !dir.exists() {
        warn!(%category, dir = %dir.display(), "Directory not found");
        return Ok(());
    }

    for path in discover_csv_files(dir)? {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(%category, file = %file_name, "Processing file");

        process_file(store, category, &path)?;
    }

    Ok(())
}

/// Lists regular `*.csv` files directly inside `dir`, sorted by path.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(".csv"))
        {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Merges one CSV file into `store`, returning the number of rows kept.
#[tracing::instrument(skip_all, fields(category = %category, path = %path.display()))]
pub fn process_file(store: &mut AggregationStore, category: Category, path: &Path) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let merged =
        merge_rows(store, category, file).with_context(|| format!("reading {}", path.display()))?;

    debug!(merged, "File merged");
    Ok(merged)
}

/// Merges CSV rows from `reader` into `store`. Rows the parser rejects are
/// dropped silently; cells missing from short rows count as zero. CSV or
/// encoding errors abort.
pub fn merge_rows<R: Read>(
    store: &mut AggregationStore,
    category: Category,
    reader: R,
) -> Result<usize> {
    let mut merged = 0;

    for_each_row(reader, |row: RawRow| {
        if let Ok(observation) = parse_row(category, &row) {
            store.merge(observation);
            merged += 1;
        }
    })?;

    Ok(merged)
}
