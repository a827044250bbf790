use std::time::Instant;

use afc_core::errors::AfcError;
use afc_core::track::RawTrack;
use afc_stat::AccumulatorStore;

use crate::config::{CumulantsConfig, EtaGapConfig, QcConfig};
use crate::ensemble::{build_ensemble, BuildReport, Ensemble};
use crate::etagap;
use crate::gaps::{gap_label, NL_GAP_BINS};
use crate::nested;
use crate::qvec;
use crate::report::RunReport;

/// The correlator engine: one instance per run, one event at a time.
///
/// Construction validates the configuration and registers every enabled
/// accumulator group in the caller-owned store; per event,
/// [`Cumulants::set_event`] builds the ensemble and
/// [`Cumulants::run_all`] dispatches the enabled methods. Events are
/// mutually independent, so distinct events may be processed by
/// concurrent workers as long as each worker owns a private engine and
/// store, with partial stores combined through
/// [`AccumulatorStore::merge`].
#[derive(Debug)]
pub struct Cumulants {
    config: CumulantsConfig,
    ensemble: Ensemble,
}

impl Cumulants {
    /// Creates the engine and registers the accumulators of every
    /// enabled feature.
    ///
    /// The four multiplicity counters always exist; each feature section
    /// present in the configuration adds its own group. Registration
    /// happens exactly once, here; events only fill.
    pub fn new(config: CumulantsConfig, store: &mut AccumulatorStore) -> Result<Self, AfcError> {
        config.validate()?;
        store.create_count("mult-raw")?;
        store.create_count("mult-accepted")?;
        store.create_count("mult-selected")?;
        store.create_count("mult-used")?;
        if let Some(cfg) = &config.eta_gap {
            register_eta_gap(cfg, store)?;
        }
        if let Some(cfg) = &config.qc {
            register_qc(cfg, store)?;
        }
        if config.nl4.is_some() {
            register_nl("nl4", store)?;
        }
        if config.nl3.is_some() {
            register_nl("nl3", store)?;
        }
        Ok(Self {
            config,
            ensemble: Ensemble::new(),
        })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &CumulantsConfig {
        &self.config
    }

    /// Returns the current event's ensemble.
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Returns the current ensemble multiplicity M.
    pub fn multiplicity(&self) -> u32 {
        self.ensemble.len() as u32
    }

    /// Ingests one event's raw particle list.
    ///
    /// The ensemble is rebuilt from scratch and the three multiplicity
    /// counters are filled unconditionally, whether or not the event
    /// later passes the dispatch gate. Unresolvable entries are skipped
    /// with a diagnostic on the returned report.
    pub fn set_event(
        &mut self,
        raw_tracks: &[RawTrack],
        apply_kin_cuts: bool,
        store: &mut AccumulatorStore,
    ) -> Result<BuildReport, AfcError> {
        let report = build_ensemble(&mut self.ensemble, raw_tracks, apply_kin_cuts, &self.config)?;
        store.fill_count("mult-raw", report.counts.raw)?;
        store.fill_count("mult-accepted", report.counts.accepted)?;
        store.fill_count("mult-selected", report.counts.selected)?;
        Ok(report)
    }

    /// Dispatches every enabled correlator method for the current event.
    ///
    /// Below the minimum multiplicity nothing beyond the builder
    /// counters is touched. Otherwise the methods run in fixed order —
    /// eta-gap, flow-vector, four-nested-loop, three-nested-loop,
    /// reserved gapped correlator — each timed, each gated only by its
    /// own ceiling, and a failure in one never blocks the next.
    pub fn run_all(&self, store: &mut AccumulatorStore) -> Result<RunReport, AfcError> {
        let m = self.multiplicity();
        if m < self.config.min_mult {
            return Ok(RunReport::gated(m));
        }
        store.fill_count("mult-used", m)?;
        let mut report = RunReport::passed(m);
        if let Some(cfg) = &self.config.eta_gap {
            let start = Instant::now();
            let outcome = etagap::run_eta_gap(&self.ensemble, cfg, store).map(|_| ());
            report.record("eta-gap", start.elapsed(), outcome);
        }
        if let Some(cfg) = &self.config.qc {
            let start = Instant::now();
            let outcome = qvec::run_qc(&self.ensemble, cfg, store);
            report.record("qc", start.elapsed(), outcome);
        }
        if let Some(cfg) = &self.config.nl4 {
            let start = Instant::now();
            let outcome = nested::run_nl4(&self.ensemble, cfg, store);
            report.record("nl4", start.elapsed(), outcome);
        }
        if let Some(cfg) = &self.config.nl3 {
            let start = Instant::now();
            let outcome = nested::run_nl3(&self.ensemble, cfg, store);
            report.record("nl3", start.elapsed(), outcome);
        }
        if self.config.gapped.is_some() {
            // reserved extension point, nothing to run yet
            let start = Instant::now();
            report.record("gapped", start.elapsed(), Ok(()));
        }
        Ok(report)
    }
}

fn register_eta_gap(config: &EtaGapConfig, store: &mut AccumulatorStore) -> Result<(), AfcError> {
    for &threshold in &config.thresholds {
        let label = gap_label(threshold);
        store.create_profile(&format!("etagap-c2-{label}"))?;
        store.create_profile(&format!("etagap-c3-{label}"))?;
        store.create_profile(&format!("etagap-s2-{label}"))?;
        store.create_profile(&format!("etagap-s3-{label}"))?;
    }
    Ok(())
}

fn register_qc(config: &QcConfig, store: &mut AccumulatorStore) -> Result<(), AfcError> {
    for order in [2u8, 3, 4, 6] {
        if config.has_harmonic(order) {
            store.create_profile(&format!("q{order}-re"))?;
            store.create_profile(&format!("q{order}-im"))?;
        }
    }
    if config.has_harmonic(2) {
        store.create_profile("qc2")?;
        store.create_profile("qc4")?;
        store.create_profile("qc6")?;
    }
    if config.has_harmonic(3) {
        store.create_profile("qc2-h3")?;
        store.create_profile("qc4-h3")?;
    }
    if config.charge_split {
        store.create_count("mult-pos")?;
        store.create_count("mult-neg")?;
        for suffix in ["pos", "neg"] {
            if config.has_harmonic(2) {
                store.create_profile(&format!("qc2-{suffix}"))?;
                store.create_profile(&format!("qc4-{suffix}"))?;
            }
            if config.has_harmonic(3) {
                store.create_profile(&format!("qc2-h3-{suffix}"))?;
                store.create_profile(&format!("qc4-h3-{suffix}"))?;
            }
        }
        if config.has_harmonic(2) {
            store.create_profile("qc2-same")?;
            store.create_profile("qc4-same")?;
        }
        if config.has_harmonic(3) {
            store.create_profile("qc2-h3-same")?;
            store.create_profile("qc4-h3-same")?;
        }
    }
    Ok(())
}

fn register_nl(prefix: &str, store: &mut AccumulatorStore) -> Result<(), AfcError> {
    for &gap in NL_GAP_BINS.iter() {
        store.create_profile(&format!("{prefix}-qc4-g{}", gap_label(gap)))?;
    }
    Ok(())
}
