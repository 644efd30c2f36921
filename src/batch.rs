use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::MapError;
use crate::event::InboundEvent;
use crate::mapper::{EventMapper, MapOutcome};
use crate::record::{BatchTime, DestinationTable, DimensionalRecord, RoutedRecord};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounts {
    pub received: usize,
    pub mapped: usize,
    pub ignored: usize,
    pub skipped: usize,
}

/// Records accumulated during one invocation, grouped by destination table.
/// Every record shares the batch time.
#[derive(Debug)]
pub struct Batch {
    time: BatchTime,
    tables: BTreeMap<DestinationTable, Vec<DimensionalRecord>>,
    counts: BatchCounts,
}

impl Batch {
    pub fn new(time: BatchTime) -> Self {
        Self {
            time,
            tables: BTreeMap::new(),
            counts: BatchCounts::default(),
        }
    }

    pub fn counts(&self) -> BatchCounts {
        self.counts
    }

    /// Maps one event into the batch. An unmappable event is logged and
    /// skipped; it never affects the other events of the batch.
    pub fn ingest(&mut self, mapper: &dyn EventMapper, event: &InboundEvent) {
        self.counts.received += 1;
        match mapper.map(event, self.time) {
            Ok(MapOutcome::Records(records)) => {
                self.counts.mapped += 1;
                for routed in records {
                    self.push(routed);
                }
            }
            Ok(MapOutcome::Ignored(reason)) => {
                self.counts.ignored += 1;
                debug!(reason, "event ignored");
            }
            Err(e) => self.record_skip(&e),
        }
    }

    /// Counts an event that failed before it reached a mapper (e.g. an
    /// undecodable payload).
    pub fn skip(&mut self, error: &MapError) {
        self.counts.received += 1;
        self.record_skip(error);
    }

    fn record_skip(&mut self, error: &MapError) {
        self.counts.skipped += 1;
        warn!(error = %error, "skipping unmappable event");
    }

    pub fn push(&mut self, routed: RoutedRecord) {
        self.tables
            .entry(routed.table)
            .or_default()
            .push(routed.record);
    }

    pub fn records(&self, table: DestinationTable) -> &[DimensionalRecord] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty tables in write order.
    pub fn into_tables(self) -> impl Iterator<Item = (DestinationTable, Vec<DimensionalRecord>)> {
        self.tables.into_iter().filter(|(_, records)| !records.is_empty())
    }
}
