use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use crossbeam_channel::Sender;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One timestamped line of the user-facing activity feed.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

impl ActivityEntry {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self::at(Local::now(), severity, message)
    }

    pub fn at(timestamp: DateTime<Local>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Sink for activity entries.
///
/// Lets the live loop report cycle outcomes without knowing whether they end
/// up in the log, in a channel to another thread, or nowhere.
pub trait ActivityLog: Send {
    fn record(&mut self, entry: ActivityEntry);

    fn info(&mut self, message: &str) {
        self.record(ActivityEntry::new(Severity::Info, message));
    }

    fn warn(&mut self, message: &str) {
        self.record(ActivityEntry::new(Severity::Warning, message));
    }

    fn error(&mut self, message: &str) {
        self.record(ActivityEntry::new(Severity::Error, message));
    }
}

/// Discards everything. Used by tests and callers that show no feed.
pub struct NullActivityLog;

impl ActivityLog for NullActivityLog {
    fn record(&mut self, _entry: ActivityEntry) {}
}

/// Forwards to the `log` facade and keeps the most recent entries.
pub struct LoggingActivityLog {
    capacity: usize,
    entries: VecDeque<ActivityEntry>,
}

impl LoggingActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LoggingActivityLog {
    fn default() -> Self {
        Self::new(crate::shared::constants::ACTIVITY_LOG_CAPACITY)
    }
}

impl ActivityLog for LoggingActivityLog {
    fn record(&mut self, entry: ActivityEntry) {
        match entry.severity {
            Severity::Info => log::info!("{entry}"),
            Severity::Warning => log::warn!("{entry}"),
            Severity::Error => log::error!("{entry}"),
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

/// Sends entries to another thread, wrapped in that thread's message type.
pub struct ChannelActivityLog<M: Send> {
    tx: Sender<M>,
    wrap: fn(ActivityEntry) -> M,
}

impl<M: Send> ChannelActivityLog<M> {
    pub fn new(tx: Sender<M>, wrap: fn(ActivityEntry) -> M) -> Self {
        Self { tx, wrap }
    }
}

impl<M: Send> ActivityLog for ChannelActivityLog<M> {
    fn record(&mut self, entry: ActivityEntry) {
        // Receiver gone means nobody is watching any more.
        let _ = self.tx.send((self.wrap)(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_display_format() {
        let ts = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        let entry = ActivityEntry::at(ts, Severity::Info, "Detected 2 faces");
        assert_eq!(entry.to_string(), "[09:05:07] Detected 2 faces");
    }

    #[test]
    fn test_null_log_is_noop() {
        let mut log = NullActivityLog;
        log.info("a");
        log.warn("b");
        log.error("c");
    }

    #[test]
    fn test_logging_log_keeps_last_entries() {
        let mut log = LoggingActivityLog::new(2);
        log.info("one");
        log.warn("two");
        log.error("three");

        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(log.entries().last().unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_channel_log_wraps_entries() {
        #[derive(Debug)]
        enum Msg {
            Activity(ActivityEntry),
        }

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut log = ChannelActivityLog::new(tx, Msg::Activity);
        log.warn("backend slow");

        let Msg::Activity(entry) = rx.try_recv().unwrap();
        assert_eq!(entry.severity, Severity::Warning);
        assert_eq!(entry.message, "backend slow");
    }

    #[test]
    fn test_channel_log_survives_dropped_receiver() {
        let (tx, rx) = crossbeam_channel::unbounded::<ActivityEntry>();
        drop(rx);
        let mut log = ChannelActivityLog::new(tx, |e| e);
        log.info("nobody listening");
    }
}
