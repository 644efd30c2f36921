use std::sync::Arc;

use async_trait::async_trait;
use deltalake::arrow::array::{ArrayRef, StringArray};
use deltalake::arrow::datatypes::{DataType, Field, Schema};
use deltalake::arrow::record_batch::RecordBatch;
use deltalake::arrow::util::pretty::pretty_format_batches;
use deltalake::datafusion::prelude::SessionContext;
use deltalake::{DeltaOps, DeltaTableBuilder, DeltaTableError};
use once_cell::sync::Lazy;
use tracing::{debug, info, trace, Level};

use crate::error::SinkError;
use crate::record::{DestinationTable, DimensionalRecord, WriteRequest};
use crate::writer::RecordWriter;

static RECORD_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        Field::new("measure_name", DataType::Utf8, false),
        Field::new("measure_value_type", DataType::Utf8, false),
        Field::new("time", DataType::Utf8, false),
        Field::new("dimensions", DataType::Utf8, false),
        Field::new("measures", DataType::Utf8, false),
    ])
});

/// One row per record; dimensions and measures are kept as JSON text.
pub fn records_to_batch(records: &[DimensionalRecord]) -> Result<RecordBatch, SinkError> {
    let mut measure_names = Vec::with_capacity(records.len());
    let mut value_types = Vec::with_capacity(records.len());
    let mut times = Vec::with_capacity(records.len());
    let mut dimensions = Vec::with_capacity(records.len());
    let mut measures = Vec::with_capacity(records.len());

    for record in records {
        measure_names.push(record.measure_name.clone());
        value_types.push(record.measure_value_type.as_str().to_string());
        times.push(record.time.clone());
        dimensions.push(serde_json::to_string(&record.dimensions)?);
        measures.push(serde_json::to_string(&record.measures)?);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(measure_names)),
        Arc::new(StringArray::from(value_types)),
        Arc::new(StringArray::from(times)),
        Arc::new(StringArray::from(dimensions)),
        Arc::new(StringArray::from(measures)),
    ];
    let batch = RecordBatch::try_new(Arc::new(RECORD_SCHEMA.clone()), columns)
        .map_err(DeltaTableError::from)?;

    Ok(batch)
}

/// Writes each destination table to its own Delta table under `root`.
/// Every call is one Delta commit.
#[derive(Debug, Clone)]
pub struct DeltaRecordWriter {
    root: String,
}

impl DeltaRecordWriter {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn table_uri(&self, table: DestinationTable) -> String {
        format!("{}/{}", self.root.trim_end_matches('/'), table.as_str())
    }
}

#[async_trait]
impl RecordWriter for DeltaRecordWriter {
    async fn write_records(
        &self,
        table: DestinationTable,
        records: &[DimensionalRecord],
    ) -> Result<(), SinkError> {
        if tracing::enabled!(Level::TRACE) {
            let request = serde_json::to_string(&WriteRequest { table, records })?;
            trace!(%request, "write request");
        }

        let batch = records_to_batch(records)?;
        let uri = self.table_uri(table);

        let ops = DeltaOps::try_from_uri(&uri).await?;
        let written = ops.write(vec![batch]).await?;
        debug!(table = %table, version = written.version(), rows = records.len(), "committed delta write");

        Ok(())
    }
}

pub async fn load_delta_table(
    ctx: &SessionContext,
    uri: &str,
    tbl_name: &str,
) -> Result<(), DeltaTableError> {
    let tbl = DeltaTableBuilder::from_uri(uri).load().await?;
    ctx.register_table(tbl_name, Arc::new(tbl))?;

    Ok(())
}

/// Logs the row count of every destination table that already exists under
/// the writer's root.
pub async fn report_existing_tables(
    writer: &DeltaRecordWriter,
    tables: &[DestinationTable],
) -> Result<(), DeltaTableError> {
    let ctx = SessionContext::new();

    for table in tables {
        let name = table.as_str().to_lowercase();
        match load_delta_table(&ctx, &writer.table_uri(*table), &name).await {
            Ok(()) => {
                let results = ctx
                    .sql(&format!("SELECT COUNT(*) AS records FROM {name}"))
                    .await?
                    .collect()
                    .await?;
                info!(table = %table, "existing table\n{}", pretty_format_batches(&results)?);
            }
            Err(e) => info!(table = %table, error = %e, "no existing data"),
        }
    }

    Ok(())
}
