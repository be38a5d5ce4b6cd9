//! Concurrent batch execution.
//!
//! Units are fed through a `futures` stream with `buffer_unordered`, so at
//! most `concurrency` queries are in flight. Completions are drained by the
//! calling task alone: appending a record or failure, bumping the progress
//! counter and invoking the progress callback all happen in that one loop.

use crate::executor::QueryExecutor;
use crate::types::{ProgressState, QueryFailure, QueryUnit, ResultRecord};
use futures::stream::{self, StreamExt};

/// Everything a finished batch produced.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successful records in completion order
    pub records: Vec<ResultRecord>,
    /// One entry per unit that failed
    pub failures: Vec<QueryFailure>,
}

impl BatchOutcome {
    /// Number of units that reached a terminal state.
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Runs a set of query units with a bounded worker pool.
pub struct BatchRunner {
    executor: QueryExecutor,
    concurrency: usize,
}

impl BatchRunner {
    /// `concurrency` is clamped to at least one in-flight query.
    pub fn new(executor: QueryExecutor, concurrency: usize) -> Self {
        Self {
            executor,
            concurrency: concurrency.max(1),
        }
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Execute every unit and collect the outcome.
    ///
    /// Returns only once every unit has either produced a record or been
    /// recorded as a failure. `on_progress` is called once per completed
    /// unit with a monotonically increasing count.
    pub async fn run<F>(&self, units: &[QueryUnit], mut on_progress: F) -> BatchOutcome
    where
        F: FnMut(ProgressState),
    {
        let mut progress = ProgressState {
            completed: 0,
            total: units.len(),
        };
        let mut outcome = BatchOutcome {
            records: Vec::with_capacity(units.len()),
            failures: Vec::new(),
        };

        tracing::info!(
            total = units.len(),
            concurrency = self.concurrency,
            target = %self.executor.target(),
            "starting query batch"
        );

        let executor = &self.executor;
        let mut completions = stream::iter(units)
            .map(|unit| async move { (unit, executor.execute(unit).await) })
            .buffer_unordered(self.concurrency);

        while let Some((unit, result)) = completions.next().await {
            match result {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    tracing::warn!(
                        keyword = %unit.keyword,
                        location = %unit.location,
                        error = %e,
                        "query failed"
                    );
                    outcome.failures.push(QueryFailure {
                        keyword: unit.keyword.clone(),
                        location: unit.location.clone(),
                        message: e.to_string(),
                    });
                }
            }

            progress.completed += 1;
            on_progress(progress);
        }

        tracing::info!(
            records = outcome.records.len(),
            failures = outcome.failures.len(),
            "query batch complete"
        );

        outcome
    }
}
