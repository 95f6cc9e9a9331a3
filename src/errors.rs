//! Process-wide error reporting stack.
//!
//! # Responsibilities
//! - Collect failure reports from any thread or task
//! - Serve them back most-recent-first (LIFO)
//! - Serialize records as `{source, message, timestamp}`
//!
//! # Design Decisions
//! - One mutex guards the whole stack; push/pop/peek are linearizable
//! - `pop`/`peek` return `None` on an empty stack rather than a default
//! - `drain` is lazy and one-shot; dropping it early leaves the remainder

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use time::OffsetDateTime;

/// A single reported failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Plugin or queue that reported the failure.
    pub source: String,

    /// Human-readable failure description.
    pub message: String,

    /// Wall-clock time the report was made, RFC 3339 on the wire.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Thread-safe LIFO store of [`ErrorRecord`]s.
///
/// Constructed once at startup and handed by reference to every plugin and
/// work queue that needs to report; background failures surface only here,
/// never as HTTP responses.
#[derive(Debug, Default)]
pub struct ErrorStack {
    records: Mutex<Vec<ErrorRecord>>,
}

impl ErrorStack {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ErrorRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a record with the timestamp set to now. Callable from anywhere.
    pub fn report(&self, source: &str, message: impl Into<String>) {
        let record = ErrorRecord {
            source: source.to_string(),
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
        };
        self.lock().push(record);
    }

    /// Remove and return the most recently pushed record.
    pub fn pop(&self) -> Option<ErrorRecord> {
        self.lock().pop()
    }

    /// Return the most recent record without removing it.
    pub fn peek(&self) -> Option<ErrorRecord> {
        self.lock().last().cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Destructive, most-recent-first iterator over the queued records.
    ///
    /// Each record is removed as it is produced, so a partially consumed
    /// iterator leaves the rest of the stack intact for a later reader.
    pub fn drain(&self) -> Drain<'_> {
        Drain { stack: self }
    }
}

/// Lazy one-shot iterator returned by [`ErrorStack::drain`].
pub struct Drain<'a> {
    stack: &'a ErrorStack,
}

impl Iterator for Drain<'_> {
    type Item = ErrorRecord;

    fn next(&mut self) -> Option<ErrorRecord> {
        self.stack.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_is_lifo() {
        let stack = ErrorStack::new();
        stack.report("a", "first");
        stack.report("b", "second");
        stack.report("c", "third");

        assert_eq!(stack.pop().unwrap().message, "third");
        assert_eq!(stack.pop().unwrap().message, "second");
        assert_eq!(stack.pop().unwrap().message, "first");
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let stack = ErrorStack::new();
        stack.report("a", "only");

        assert_eq!(stack.peek().unwrap().message, "only");
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.pop().unwrap().message, "only");
        assert!(stack.peek().is_none());
    }

    #[test]
    fn test_empty_stack() {
        let stack = ErrorStack::new();
        assert!(stack.is_empty());
        assert!(stack.pop().is_none());
        assert!(stack.peek().is_none());

        stack.report("a", "x");
        assert!(!stack.is_empty());
    }

    #[test]
    fn test_drain_most_recent_first() {
        let stack = ErrorStack::new();
        for i in 0..4 {
            stack.report("a", format!("msg {}", i));
        }

        let drained: Vec<String> = stack.drain().map(|r| r.message).collect();
        assert_eq!(drained, vec!["msg 3", "msg 2", "msg 1", "msg 0"]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_partial_drain_leaves_remainder() {
        let stack = ErrorStack::new();
        stack.report("a", "oldest");
        stack.report("a", "newest");

        let taken: Vec<String> = stack.drain().take(1).map(|r| r.message).collect();
        assert_eq!(taken, vec!["newest"]);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.pop().unwrap().message, "oldest");
    }

    #[test]
    fn test_wire_shape() {
        let stack = ErrorStack::new();
        stack.report("denon", "connection refused");

        let value = serde_json::to_value(stack.peek().unwrap()).unwrap();
        assert_eq!(value["source"], "denon");
        assert_eq!(value["message"], "connection refused");
        assert!(value["timestamp"].is_string());
    }
}
