//! Per-identity attribute record with last-writer-wins-by-timestamp writes.
//!
//! Ordering rule for `apply(name, value, ts)`:
//! - first write for `name` is always stored, even with `ts == 0`;
//! - `ts == 0` means "no timestamp" and always replaces the stored value;
//! - otherwise the write lands only when `ts` is strictly greater than the
//!   stored timestamp. Equal or older timestamps are discarded.
//!
//! Discards are normal outcomes, not errors: out-of-order delivery self-corrects
//! because the largest timestamp wins regardless of arrival order.

use std::collections::BTreeMap;

use serde::Serialize;

/// Latest accepted value for one metric name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttributeValue {
    pub value: f64,
    pub timestamp: i64,
}

/// Result of [`AttributeRecord::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// First value stored for this name.
    Inserted,
    /// Replaced an older value.
    Updated,
    /// Older or tied timestamp; record unchanged.
    Discarded,
}

impl WriteOutcome {
    pub fn is_accepted(self) -> bool {
        !matches!(self, WriteOutcome::Discarded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteOutcome::Inserted => "inserted",
            WriteOutcome::Updated => "updated",
            WriteOutcome::Discarded => "discarded",
        }
    }
}

/// Metric name -> latest value for one identity. Names are stored unprefixed.
#[derive(Debug, Clone, Default)]
pub struct AttributeRecord {
    attrs: BTreeMap<String, AttributeValue>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, name: &str, value: f64, timestamp: i64) -> WriteOutcome {
        let incoming = AttributeValue { value, timestamp };
        match self.attrs.get_mut(name) {
            None => {
                self.attrs.insert(name.to_string(), incoming);
                WriteOutcome::Inserted
            }
            Some(stored) if timestamp == 0 || timestamp > stored.timestamp => {
                *stored = incoming;
                WriteOutcome::Updated
            }
            Some(_) => WriteOutcome::Discarded,
        }
    }

    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        self.attrs.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AttributeValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_timestamp_is_discarded() {
        let mut r = AttributeRecord::new();
        assert_eq!(r.apply("cpu1", 100.0, 100), WriteOutcome::Inserted);
        assert_eq!(r.apply("cpu1", 88.0, 88), WriteOutcome::Discarded);
        assert_eq!(r.get("cpu1"), Some(AttributeValue { value: 100.0, timestamp: 100 }));
    }

    #[test]
    fn largest_timestamp_wins_regardless_of_arrival_order() {
        let mut r = AttributeRecord::new();
        for (v, ts) in [(5.0, 5), (9.0, 9), (1.0, 1), (7.0, 7)] {
            r.apply("m", v, ts);
        }
        assert_eq!(r.get("m").map(|a| a.value), Some(9.0));
    }

    #[test]
    fn tie_keeps_first_value() {
        let mut r = AttributeRecord::new();
        r.apply("m", 1.0, 42);
        assert_eq!(r.apply("m", 2.0, 42), WriteOutcome::Discarded);
        assert_eq!(r.get("m").map(|a| a.value), Some(1.0));
    }

    #[test]
    fn zero_timestamp_always_lands() {
        let mut r = AttributeRecord::new();
        assert_eq!(r.apply("m", 1.0, 0), WriteOutcome::Inserted);
        assert_eq!(r.apply("m", 2.0, 0), WriteOutcome::Updated);
        r.apply("m", 3.0, 500);
        assert_eq!(r.apply("m", 4.0, 0), WriteOutcome::Updated);
        assert_eq!(r.get("m"), Some(AttributeValue { value: 4.0, timestamp: 0 }));
        // a stored zero is beaten by any positive timestamp
        assert_eq!(r.apply("m", 5.0, 1), WriteOutcome::Updated);
    }

    #[test]
    fn names_are_independent() {
        let mut r = AttributeRecord::new();
        r.apply("a", 1.0, 10);
        r.apply("b", 2.0, 1);
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("b").map(|a| a.value), Some(2.0));
        assert!(r.get("c").is_none());
    }
}
