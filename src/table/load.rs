// src/table/load.rs

use anyhow::{anyhow, Context, Result};
use arrow::{
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{fs::File, path::Path, sync::Arc};
use tracing::{debug, error, info};

use super::IncidentTable;
use crate::schema::{add_derived_metrics, normalize};

const BATCH_SIZE: usize = 8_192;

/// Read a delimited file with a header row, keeping every column as text.
/// Type coercion is the normalizer's job, not the reader's. Rows shorter than
/// the header get nulls in their trailing cells; longer rows are an error.
pub fn read_csv_as_text<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();

    // Header names only; inference of types is ignored.
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(file, Some(0))
        .with_context(|| format!("reading header of {:?}", path))?;
    if inferred.fields().is_empty() {
        return Err(anyhow!("{:?} has no header row", path));
    }

    let text_fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    let text_schema = Arc::new(Schema::new(text_fields));

    let file = File::open(path).with_context(|| format!("re-opening {:?}", path))?;
    let reader = ReaderBuilder::new(text_schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_truncated_rows(true)
        .build(file)
        .context("Failed to create Arrow CSV reader")?;

    let mut batches = Vec::new();
    for (idx, batch) in reader.enumerate() {
        let batch =
            batch.with_context(|| format!("CSV parse error in {:?} at batch {}", path, idx))?;
        batches.push(batch);
    }
    debug!(batches = batches.len(), "read csv batches");

    arrow::compute::concat_batches(&text_schema, &batches).context("concatenating CSV batches")
}

/// Load, normalize and enrich the incident file at `path`.
///
/// Never fails: an unreadable or malformed source yields
/// [`IncidentTable::empty`], which callers must treat as "load failed".
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_incidents<P: AsRef<Path>>(path: P) -> IncidentTable {
    match try_load(path.as_ref()) {
        Ok(table) => {
            info!(
                rows = table.num_rows(),
                columns = table.num_columns(),
                "loaded incidents"
            );
            table
        }
        Err(e) => {
            error!("Error loading data: {:#}", e);
            IncidentTable::empty()
        }
    }
}

fn try_load(path: &Path) -> Result<IncidentTable> {
    let raw = read_csv_as_text(path)?;
    let normalized = normalize(&raw).context("normalizing columns")?;
    let enriched = add_derived_metrics(&normalized).context("deriving metrics")?;
    Ok(IncidentTable::from_batch(enriched))
}
