use std::num::NonZeroUsize;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::batch::Batch;
use crate::error::{BatchWriteError, InvalidChunkSize, SinkError, WriteError};
use crate::record::{DestinationTable, DimensionalRecord};

/// Per-call item cap of the time-series store.
pub const DEFAULT_MAX_CHUNK: usize = 100;

/// One write call against the time-series store.
/// Infrastructure (e.g. the Delta sink) implements this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordWriter: Send + Sync {
    async fn write_records(
        &self,
        table: DestinationTable,
        records: &[DimensionalRecord],
    ) -> Result<(), SinkError>;
}

/// Consecutive slices of at most `max_chunk` records, in input order.
pub fn chunk<T>(records: &[T], max_chunk: NonZeroUsize) -> impl Iterator<Item = &[T]> {
    records.chunks(max_chunk.get())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub tables: Vec<(DestinationTable, usize)>,
}

impl WriteSummary {
    pub fn total(&self) -> usize {
        self.tables.iter().map(|(_, n)| n).sum()
    }
}

pub struct ChunkedWriter<W> {
    writer: W,
    max_chunk: NonZeroUsize,
}

impl<W: RecordWriter> ChunkedWriter<W> {
    pub fn new(writer: W, max_chunk: usize) -> Result<Self, InvalidChunkSize> {
        let max_chunk = NonZeroUsize::new(max_chunk).ok_or(InvalidChunkSize)?;
        Ok(Self { writer, max_chunk })
    }

    pub fn max_chunk(&self) -> usize {
        self.max_chunk.get()
    }

    pub fn inner(&self) -> &W {
        &self.writer
    }

    /// Writes `records` slice by slice. Stops at the first failing slice;
    /// slices already written stay written.
    #[instrument(skip(self, records), fields(table = %table, record_count = records.len()))]
    pub async fn write(
        &self,
        table: DestinationTable,
        records: &[DimensionalRecord],
    ) -> Result<usize, WriteError> {
        let mut written = 0;

        for (slice_index, slice) in chunk(records, self.max_chunk).enumerate() {
            if let Err(source) = self.writer.write_records(table, slice).await {
                warn!(
                    table = %table,
                    slice_index,
                    item_count = slice.len(),
                    written,
                    error = %source,
                    "write failed, abandoning remaining slices"
                );
                return Err(WriteError {
                    table,
                    slice_index,
                    item_count: slice.len(),
                    written,
                    source,
                });
            }
            written += slice.len();
            debug!(table = %table, slice_index, item_count = slice.len(), "wrote slice");
        }

        info!(table = %table, written, "successfully wrote records");
        Ok(written)
    }

    /// Writes every non-empty table of `batch` in table order, stopping at the
    /// first table that fails. The error keeps what was committed before it.
    pub async fn write_batch(&self, batch: Batch) -> Result<WriteSummary, BatchWriteError> {
        let mut summary = WriteSummary::default();
        for (table, records) in batch.into_tables() {
            match self.write(table, &records).await {
                Ok(written) => summary.tables.push((table, written)),
                Err(source) => {
                    return Err(BatchWriteError {
                        committed: summary,
                        source,
                    })
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BatchTime, Dimension, RoutedRecord};
    use mockall::Sequence;

    fn records(n: usize) -> Vec<DimensionalRecord> {
        (0..n)
            .map(|i| {
                DimensionalRecord::new(
                    "Queue",
                    vec![Dimension::new("QueueId", format!("q{i}"))],
                    vec![],
                    BatchTime::from_millis(1),
                )
            })
            .collect()
    }

    #[test]
    fn test_chunk_counts_and_order() {
        let max = NonZeroUsize::new(100).unwrap();
        for n in [0usize, 1, 99, 100, 101, 250] {
            let input: Vec<usize> = (0..n).collect();
            let slices: Vec<&[usize]> = chunk(&input, max).collect();

            assert_eq!(slices.len(), n.div_ceil(100));
            assert!(slices.iter().all(|s| s.len() <= 100 && !s.is_empty()));
            assert_eq!(slices.concat(), input);
        }
    }

    #[test]
    fn test_zero_chunk_rejected() {
        assert!(ChunkedWriter::new(MockRecordWriter::new(), 0).is_err());
        let writer = ChunkedWriter::new(MockRecordWriter::new(), 7).unwrap();
        assert_eq!(writer.max_chunk(), 7);
    }

    #[tokio::test]
    async fn test_write_all_slices() {
        let mut mock = MockRecordWriter::new();
        let mut seq = Sequence::new();
        for (first, len) in [("q0", 2usize), ("q2", 2), ("q4", 1)] {
            mock.expect_write_records()
                .withf(move |table, records| {
                    *table == DestinationTable::Queue
                        && records.len() == len
                        && records[0].dimension("QueueId") == Some(first)
                })
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }

        let writer = ChunkedWriter::new(mock, 2).unwrap();
        let written = writer
            .write(DestinationTable::Queue, &records(5))
            .await
            .unwrap();

        assert_eq!(written, 5);
    }

    #[tokio::test]
    async fn test_stops_at_first_failed_slice() {
        let mut mock = MockRecordWriter::new();
        let mut seq = Sequence::new();
        mock.expect_write_records()
            .withf(|_, records| records[0].dimension("QueueId") == Some("q0"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_write_records()
            .withf(|_, records| records[0].dimension("QueueId") == Some("q3"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(SinkError::Unavailable("throttled".to_string())));

        let writer = ChunkedWriter::new(mock, 3).unwrap();
        let err = writer
            .write(DestinationTable::Queue, &records(10))
            .await
            .unwrap_err();

        assert_eq!(err.table, DestinationTable::Queue);
        assert_eq!(err.slice_index, 1);
        assert_eq!(err.item_count, 3);
        assert_eq!(err.written, 3);
        // No expectation matches q6 or q9, so a third call would panic.
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let writer = ChunkedWriter::new(MockRecordWriter::new(), 100).unwrap();
        let written = writer.write(DestinationTable::User, &[]).await.unwrap();
        assert_eq!(written, 0);
    }
    #[tokio::test]
    async fn test_write_batch_keeps_committed_tables() {
        let mut batch = Batch::new(BatchTime::from_millis(1));
        for (table, n) in [
            (DestinationTable::AgentEvent, 1),
            (DestinationTable::AgentEventContact, 3),
        ] {
            for record in records(n) {
                batch.push(RoutedRecord { table, record });
            }
        }

        let mut mock = MockRecordWriter::new();
        mock.expect_write_records()
            .withf(|table, _| *table == DestinationTable::AgentEvent)
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_write_records()
            .withf(|table, records| {
                *table == DestinationTable::AgentEventContact && records.len() == 2
            })
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_write_records()
            .withf(|table, records| {
                *table == DestinationTable::AgentEventContact && records.len() == 1
            })
            .times(1)
            .returning(|_, _| Err(SinkError::Unavailable("throttled".to_string())));

        let writer = ChunkedWriter::new(mock, 2).unwrap();
        let err = writer.write_batch(batch).await.unwrap_err();

        assert_eq!(
            err.committed.tables,
            vec![(DestinationTable::AgentEvent, 1)]
        );
        assert_eq!(err.source.table, DestinationTable::AgentEventContact);
        assert_eq!(err.source.written, 2);
        assert_eq!(err.records_committed(), 3);
        assert!(err.to_string().contains("1 records were committed earlier"));
    }
}
