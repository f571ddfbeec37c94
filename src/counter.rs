//! Atomic integer counters.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::registry::{Registry, RegistryError, Var};

/// A 64-bit counter updated with relaxed atomics. Safe to share across threads
/// behind an `Arc`; no operation ever blocks.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    pub fn new(n: i64) -> Self {
        Self {
            value: AtomicI64::new(n),
        }
    }

    /// Build a counter and publish it under `name`.
    pub fn publish(registry: &Registry, name: &str, n: i64) -> Result<Arc<Self>, RegistryError> {
        registry.publish(name, Arc::new(Self::new(n)))
    }

    pub fn add(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn set(&self, n: i64) {
        self.value.store(n, Ordering::Relaxed);
    }

    pub fn load(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.load())
    }
}

impl Var for Counter {
    fn json(&self) -> Value {
        Value::from(self.load())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// A [`Counter`] that renders with thousands separators (`1234567` -> `1,234,567`).
///
/// Holds an `i64`; render larger unsigned values with [`format_thousands`].
#[derive(Debug, Default)]
pub struct FormattedCounter {
    inner: Counter,
}

impl FormattedCounter {
    pub fn new(n: i64) -> Self {
        Self {
            inner: Counter::new(n),
        }
    }

    pub fn publish(registry: &Registry, name: &str, n: i64) -> Result<Arc<Self>, RegistryError> {
        registry.publish(name, Arc::new(Self::new(n)))
    }

    pub fn add(&self, delta: i64) {
        self.inner.add(delta);
    }

    pub fn set(&self, n: i64) {
        self.inner.set(n);
    }

    pub fn load(&self) -> i64 {
        self.inner.load()
    }
}

impl fmt::Display for FormattedCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_thousands(self.load()))
    }
}

impl Var for FormattedCounter {
    // Kept as a string so scrapers see exactly what the text dump shows.
    fn json(&self) -> Value {
        Value::String(self.to_string())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// Render any integer up to 128 bits with a comma every three digits.
pub fn format_thousands(n: impl Into<i128>) -> String {
    let n: i128 = n.into();
    let grouped = group_thousands(&n.unsigned_abs().to_string());
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Insert a comma every three digits counting from the least significant end.
/// `digits` must be a plain run of ASCII decimal digits.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    if len < 4 {
        return digits.to_string();
    }

    let lead = match len % 3 {
        0 => 3,
        r => r,
    };
    let mut out = String::with_capacity(len + (len - 1) / 3);
    out.push_str(&digits[..lead]);
    for group in digits.as_bytes()[lead..].chunks(3) {
        out.push(',');
        out.extend(group.iter().map(|&b| b as char));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_add_set_load() {
        let n = Counter::new(0);
        assert_eq!(n.load(), 0);
        n.add(1);
        assert_eq!(n.load(), 1);
        n.set(5);
        assert_eq!(n.load(), 5);
        n.add(1);
        assert_eq!(n.load(), 6);
        assert_eq!(n.to_string(), "6");
        n.add(-10);
        assert_eq!(n.to_string(), "-4");
    }

    #[test]
    fn formatted_counter_groups_digits() {
        let cases: [(i64, &str); 7] = [
            (1, "1"),
            (999, "999"),
            (1000, "1,000"),
            (1001, "1,001"),
            (11001, "11,001"),
            (122001, "122,001"),
            (446744073709551615, "446,744,073,709,551,615"),
        ];
        for (input, output) in cases {
            let n = FormattedCounter::new(input);
            assert_eq!(n.to_string(), output, "rendering {input}");
        }
    }

    #[test]
    fn formatted_counter_extremes() {
        assert_eq!(format_thousands(0u8), "0");
        assert_eq!(format_thousands(u64::MAX), "18,446,744,073,709,551,615");
        assert_eq!(format_thousands(i64::MAX), "9,223,372,036,854,775,807");
        assert_eq!(format_thousands(i64::MIN), "-9,223,372,036,854,775,808");
        assert_eq!(format_thousands(-123i64), "-123");
        assert_eq!(format_thousands(-1234i64), "-1,234");
    }

    #[test]
    fn formatted_counter_updates_in_place() {
        let n = FormattedCounter::default();
        n.set(999);
        assert_eq!(n.to_string(), "999");
        n.add(1);
        assert_eq!(n.to_string(), "1,000");
        assert_eq!(n.json(), Value::String("1,000".into()));
    }

    #[test]
    fn counter_survives_concurrent_adds() {
        let n = Counter::default();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..10_000 {
                        n.add(1);
                    }
                });
            }
        });
        assert_eq!(n.load(), 80_000);
    }
}
