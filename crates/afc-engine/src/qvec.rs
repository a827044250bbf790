use afc_core::{AfcError, Complex};
use afc_stat::AccumulatorStore;

use crate::config::QcConfig;
use crate::ensemble::Ensemble;

/// Flow vectors Q_n = sum_i exp(i n phi_i) for n in 2..=6.
///
/// Recomputed fully for each event; never persisted across events.
#[derive(Debug, Clone, Copy)]
struct FlowVectors {
    q: [Complex; 7],
}

impl FlowVectors {
    fn accumulate(phis: impl Iterator<Item = f64>) -> Self {
        let mut q = [Complex::zero(); 7];
        for phi in phis {
            for (n, slot) in q.iter_mut().enumerate().skip(2) {
                *slot += Complex::unit(n as f64 * phi);
            }
        }
        Self { q }
    }

    fn get(&self, order: u8) -> Complex {
        self.q[order as usize]
    }
}

// Single-event correlators below: the closed-form combinations remove
// the self-correlation bias of the raw flow-vector moments, so each one
// equals the average over distinct index tuples.

// <cos n(phi1 - phi2)> over distinct pairs; needs M > 1.
fn corr_two(qn: Complex, m: f64) -> f64 {
    (qn.norm_sq() - m) / (m * (m - 1.0))
}

// <cos n(phi1 + phi2 - phi3 - phi4)> over distinct 4-tuples; needs M > 3.
fn corr_four(qn: Complex, q2n: Complex, m: f64) -> f64 {
    let qn2 = qn.norm_sq();
    let q2n2 = q2n.norm_sq();
    let cross = (q2n * qn.conj().powi(2)).re;
    let m4 = m * (m - 1.0) * (m - 2.0) * (m - 3.0);
    (qn2 * qn2 + q2n2 - 2.0 * cross - 4.0 * (m - 2.0) * qn2 + 2.0 * m * (m - 3.0)) / m4
}

// <cos 2(phi1 + phi2 + phi3 - phi4 - phi5 - phi6)> over distinct
// 6-tuples; needs M > 5.
fn corr_six_h2(q2: Complex, q4: Complex, q6: Complex, m: f64) -> f64 {
    let q22 = q2.norm_sq();
    let q42 = q4.norm_sq();
    let q62 = q6.norm_sq();
    let q42re = (q4 * q2.conj().powi(2)).re;
    let q6are = (q4 * q2 * q2.conj().powi(3)).re;
    let q6bre = (q6 * q2.conj().powi(3)).re;
    let q6cre = (q6 * q4.conj() * q2.conj()).re;
    let m6 = m * (m - 1.0) * (m - 2.0) * (m - 3.0) * (m - 4.0) * (m - 5.0);
    (q22 * q22 * q22 + 9.0 * q42 * q22 - 6.0 * q6are + 4.0 * q6bre - 12.0 * q6cre
        + 18.0 * (m - 4.0) * q42re
        + 4.0 * q62
        - 9.0 * (m - 4.0) * q22 * q22
        - 9.0 * (m - 4.0) * q42
        + 18.0 * (m - 2.0) * (m - 5.0) * q22
        - 6.0 * m * (m - 4.0) * (m - 5.0))
        / m6
}

/// Runs the flow-vector cumulant method over the ensemble.
///
/// One O(M) pass accumulates the flow vectors; the bias-corrected 2-,
/// 4- and 6-particle estimators are then written into the `qc*`
/// profiles keyed by multiplicity, each gated by its minimum-M
/// requirement. With charge splitting enabled the computation repeats
/// independently over the positively- and negatively-charged subsets,
/// and the subset estimators are additionally projected into the shared
/// same-sign profiles keyed by the total multiplicity.
pub fn run_qc(
    ensemble: &Ensemble,
    config: &QcConfig,
    store: &mut AccumulatorStore,
) -> Result<(), AfcError> {
    let m = ensemble.len() as u32;
    let mf = m as f64;
    let flow = FlowVectors::accumulate(ensemble.tracks().iter().map(|t| t.phi));

    if m > 1 {
        for order in [2u8, 3, 4, 6] {
            if !config.has_harmonic(order) {
                continue;
            }
            let qn = flow.get(order);
            store.fill_profile(&format!("q{order}-re"), m, qn.re / mf)?;
            store.fill_profile(&format!("q{order}-im"), m, qn.im / mf)?;
        }
        if config.has_harmonic(2) {
            store.fill_profile("qc2", m, corr_two(flow.get(2), mf))?;
            if m > 3 {
                store.fill_profile("qc4", m, corr_four(flow.get(2), flow.get(4), mf))?;
            }
            if m > 5 {
                store.fill_profile(
                    "qc6",
                    m,
                    corr_six_h2(flow.get(2), flow.get(4), flow.get(6), mf),
                )?;
            }
        }
        if config.has_harmonic(3) {
            store.fill_profile("qc2-h3", m, corr_two(flow.get(3), mf))?;
            if m > 3 {
                store.fill_profile("qc4-h3", m, corr_four(flow.get(3), flow.get(6), mf))?;
            }
        }
    }

    if config.charge_split {
        run_charge_split(ensemble, config, m, store)?;
    }
    Ok(())
}

fn run_charge_split(
    ensemble: &Ensemble,
    config: &QcConfig,
    total_m: u32,
    store: &mut AccumulatorStore,
) -> Result<(), AfcError> {
    let positive = FlowVectors::accumulate(
        ensemble
            .tracks()
            .iter()
            .filter(|t| t.charge > 0)
            .map(|t| t.phi),
    );
    let negative = FlowVectors::accumulate(
        ensemble
            .tracks()
            .iter()
            .filter(|t| t.charge < 0)
            .map(|t| t.phi),
    );
    let m_pos = ensemble.tracks().iter().filter(|t| t.charge > 0).count() as u32;
    let m_neg = ensemble.tracks().iter().filter(|t| t.charge < 0).count() as u32;

    store.fill_count("mult-pos", m_pos)?;
    store.fill_count("mult-neg", m_neg)?;
    write_subset(&positive, m_pos, total_m, "pos", config, store)?;
    write_subset(&negative, m_neg, total_m, "neg", config, store)?;
    Ok(())
}

/// Writes one charge subset's estimators, keyed by the subset
/// multiplicity, and projects the same values into the shared same-sign
/// profiles keyed by the total multiplicity.
fn write_subset(
    flow: &FlowVectors,
    m_subset: u32,
    total_m: u32,
    suffix: &str,
    config: &QcConfig,
    store: &mut AccumulatorStore,
) -> Result<(), AfcError> {
    if m_subset <= 1 {
        return Ok(());
    }
    let mf = m_subset as f64;
    if config.has_harmonic(2) {
        let two = corr_two(flow.get(2), mf);
        store.fill_profile(&format!("qc2-{suffix}"), m_subset, two)?;
        store.fill_profile("qc2-same", total_m, two)?;
    }
    if config.has_harmonic(3) {
        let two = corr_two(flow.get(3), mf);
        store.fill_profile(&format!("qc2-h3-{suffix}"), m_subset, two)?;
        store.fill_profile("qc2-h3-same", total_m, two)?;
    }
    if m_subset > 3 {
        if config.has_harmonic(2) {
            let four = corr_four(flow.get(2), flow.get(4), mf);
            store.fill_profile(&format!("qc4-{suffix}"), m_subset, four)?;
            store.fill_profile("qc4-same", total_m, four)?;
        }
        if config.has_harmonic(3) {
            let four = corr_four(flow.get(3), flow.get(6), mf);
            store.fill_profile(&format!("qc4-h3-{suffix}"), m_subset, four)?;
            store.fill_profile("qc4-h3-same", total_m, four)?;
        }
    }
    Ok(())
}
