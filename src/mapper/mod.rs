//! Turns inbound events into dimensional records.
//!
//! Each record kind is described by a declarative [`FieldRule`] plan; a single
//! interpreter ([`extract`]) walks the plan, so a missing optional field is
//! skipped and a missing key field becomes `"unknown"` in exactly one place.

mod agent;
mod contact;
mod directory;
mod plan;

pub use agent::*;
pub use contact::*;
pub use directory::*;
pub use plan::*;

use crate::error::MapError;
use crate::event::InboundEvent;
use crate::record::{BatchTime, RoutedRecord};

/// Result of mapping one event that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutcome {
    Records(Vec<RoutedRecord>),
    /// The event is not one this mapper handles; accepted and dropped.
    Ignored(&'static str),
}

pub trait EventMapper: Send + Sync {
    fn map(&self, event: &InboundEvent, time: BatchTime) -> Result<MapOutcome, MapError>;
}
