#![deny(missing_docs)]

//! Event-by-event multi-particle azimuthal-correlation cumulants.
//!
//! One event at a time, the engine filters raw particle entries into a
//! working ensemble, then runs the enabled correlator methods — the
//! two-particle eta-gap scan, the bias-corrected flow-vector cumulants
//! and the direct nested-loop correlators — writing every result into a
//! caller-owned [`afc_stat::AccumulatorStore`] keyed by event
//! multiplicity. Events are mutually independent; nothing carries across
//! events except the store.

/// YAML configuration schema and defaults.
pub mod config;
/// Engine construction and per-event dispatch.
pub mod engine;
/// Per-event track ensemble and selection counters.
pub mod ensemble;
/// Two-particle eta-gap correlator.
pub mod etagap;
/// Eta-separation predicates and gap-bin labels.
pub mod gaps;
/// Direct nested-loop correlators.
pub mod nested;
/// Flow-vector (generating-function) cumulants.
pub mod qvec;
/// Per-event dispatch report.
pub mod report;

pub use config::{
    CumulantsConfig, EtaGapConfig, GappedConfig, Nl3Config, Nl4Config, QcConfig,
};
pub use engine::Cumulants;
pub use ensemble::{build_ensemble, BuildReport, Ensemble, SelectionCounts, ENSEMBLE_CAPACITY};
pub use report::RunReport;
