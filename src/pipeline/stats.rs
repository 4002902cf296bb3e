//! Pipeline counters
//!
//! Progress and failures of the consumer loops are observable through these
//! counters and the logs only.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by both consumer loops
#[derive(Debug, Default)]
pub struct PipelineCounters {
    batches_acknowledged: AtomicU64,
    articles_stored: AtomicU64,
    articles_diverted: AtomicU64,
    errors_stored: AtomicU64,
    errors_dropped: AtomicU64,
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn batch_acknowledged(&self) {
        self.batches_acknowledged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn article_stored(&self) {
        self.articles_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn article_diverted(&self) {
        self.articles_diverted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn error_stored(&self) {
        self.errors_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn error_dropped(&self) {
        self.errors_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current values
    pub fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            batches_acknowledged: self.batches_acknowledged.load(Ordering::Relaxed),
            articles_stored: self.articles_stored.load(Ordering::Relaxed),
            articles_diverted: self.articles_diverted.load(Ordering::Relaxed),
            errors_stored: self.errors_stored.load(Ordering::Relaxed),
            errors_dropped: self.errors_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Batches fully processed by the article consumer
    pub batches_acknowledged: u64,

    /// Articles inserted into the `article` table
    pub articles_stored: u64,

    /// Articles that failed and were pushed onto the error queue
    pub articles_diverted: u64,

    /// Error records inserted into the `error` table
    pub errors_stored: u64,

    /// Error records that could not be stored and were discarded
    pub errors_dropped: u64,
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batches acknowledged: {}", self.batches_acknowledged)?;
        writeln!(f, "Articles stored:      {}", self.articles_stored)?;
        writeln!(f, "Articles diverted:    {}", self.articles_diverted)?;
        writeln!(f, "Errors stored:        {}", self.errors_stored)?;
        write!(f, "Errors dropped:       {}", self.errors_dropped)
    }
}
