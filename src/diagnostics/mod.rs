//! Model diagnostics: what a loaded asset contains and how it rates.
//!
//! - `metrics` walks a scene once and produces a [`metrics::MetricsSnapshot`]
//! - `quality` rates single metrics into [`quality::QualityTier`]s
//! - `report` formats a snapshot into named slots of a [`report::StatsSink`]

pub mod metrics;
pub mod quality;
pub mod report;
