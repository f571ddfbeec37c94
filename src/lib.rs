//! Live process variables.
//!
//! Atomic counters, a rolling-window float aggregate and a [`Registry`] that
//! collects them under names for a debug endpoint to dump.
//!
//! ```
//! use livevars::{Registry, RollingFloat};
//!
//! let registry = Registry::new();
//! let latency = RollingFloat::publish(&registry, "latency_ms", 0.0, 10).unwrap();
//! latency.add(1.0);
//! assert_eq!(latency.report().reports, 2);
//! ```

pub mod bytes;
pub mod cli;
pub mod counter;
pub mod multivalue;
pub mod registry;
pub mod rolling;
pub mod server;
pub mod size;
pub mod version;

pub use counter::{format_thousands, Counter, FormattedCounter};
pub use multivalue::MultiValue;
pub use registry::{Registry, RegistryError, Var};
pub use rolling::{RollingFloat, RollingReport};
pub use size::{format_human_size, parse_human_size, SizeError};
pub use version::version_info;
