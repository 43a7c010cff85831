use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    error::LocatorError,
    hierarchy::criteria::Criteria,
    resolver::finder::Resolution,
};

/// One resolution attempt, written as a JSON line.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,

    /// SHA-1 of the dump, when the snapshot was frozen
    pub snapshot: Option<String>,

    pub x: i32,
    pub y: i32,
    pub ignore_distant: bool,
    pub criteria: Criteria,

    pub candidates: Option<usize>,
    pub filters: Option<Criteria>,
    pub index: Option<usize>,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(coord: (i32, i32), ignore_distant: bool, criteria: &Criteria) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            snapshot: None,
            x: coord.0,
            y: coord.1,
            ignore_distant,
            criteria: criteria.clone(),
            candidates: None,
            filters: None,
            index: None,
            error: None,
        }
    }

    pub fn with_snapshot(mut self, fingerprint: impl ToString) -> Self {
        self.snapshot = Some(fingerprint.to_string());
        self
    }

    pub fn with_resolution(mut self, resolution: &Resolution) -> Self {
        self.candidates = Some(resolution.candidate_count);
        self.filters = Some(resolution.locator.filters().clone());
        self.index = resolution.locator.index();
        self
    }

    pub fn with_error(mut self, error: &LocatorError) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
