//! Domain models for trapmon
//!
//! Metric definitions, samples and message templates. Types are validated
//! on construction (fail-fast pattern) by the configuration layer.

pub mod metric;
pub mod template;

pub use metric::{MetricSource, MetricSpec, Sample};
pub use template::Template;
