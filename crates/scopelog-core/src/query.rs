//! In-process query helpers over fetched records

use std::path::Path;

use chrono::{DateTime, Local, Utc};

use crate::domain::{LogEntry, LogLevel, LogModel};
use crate::formatting::{export, LogFormatter};

/// Filters applicable to any collection of records.
pub trait LogQueryExt<M: LogModel>: Sized {
    /// Records written today (local calendar date).
    fn today(self) -> Vec<M>;

    /// Records with `start <= time <= end`.
    fn between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<M>;

    /// The `count` newest records, newest first.
    fn recent(self, count: usize) -> Vec<M>;
}

impl<M, I> LogQueryExt<M> for I
where
    M: LogModel,
    I: IntoIterator<Item = M>,
{
    fn today(self) -> Vec<M> {
        let today = Local::now().date_naive();
        self.into_iter()
            .filter(|r| r.time().with_timezone(&Local).date_naive() == today)
            .collect()
    }

    fn between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<M> {
        self.into_iter()
            .filter(|r| r.time() >= start && r.time() <= end)
            .collect()
    }

    fn recent(self, count: usize) -> Vec<M> {
        let mut records: Vec<M> = self.into_iter().collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.time()));
        records.truncate(count);
        records
    }
}

/// Filters specific to the default record.
pub trait LogEntryQueryExt: Sized {
    fn of_level(self, level: LogLevel) -> Vec<LogEntry>;
}

impl<I> LogEntryQueryExt for I
where
    I: IntoIterator<Item = LogEntry>,
{
    fn of_level(self, level: LogLevel) -> Vec<LogEntry> {
        self.into_iter().filter(|e| e.level == level).collect()
    }
}

/// Export helper on record slices.
pub trait ExportExt {
    fn export(&self, path: impl AsRef<Path>, formatter: &dyn LogFormatter) -> anyhow::Result<()>;
}

impl<M: LogModel> ExportExt for [M] {
    fn export(&self, path: impl AsRef<Path>, formatter: &dyn LogFormatter) -> anyhow::Result<()> {
        export(self, path, formatter)
    }
}
