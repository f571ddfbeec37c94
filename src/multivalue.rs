use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::registry::Var;

/// Comma-delimited list flag: `--tags a,b --tags c` collects `["a", "b", "c"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiValue(Vec<String>);

impl MultiValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every non-empty, trimmed item of a comma separated list.
    pub fn set(&mut self, value: &str) {
        self.0.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for MultiValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mv = Self::new();
        mv.set(s);
        Ok(mv)
    }
}

impl Extend<MultiValue> for MultiValue {
    fn extend<I: IntoIterator<Item = MultiValue>>(&mut self, iter: I) {
        for mv in iter {
            self.0.extend(mv.0);
        }
    }
}

impl FromIterator<MultiValue> for MultiValue {
    fn from_iter<I: IntoIterator<Item = MultiValue>>(iter: I) -> Self {
        let mut mv = Self::new();
        mv.extend(iter);
        mv
    }
}

impl fmt::Display for MultiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl Var for MultiValue {
    fn json(&self) -> Value {
        Value::from(self.0.clone())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}
