use afc_core::AfcError;
use afc_stat::AccumulatorStore;

use crate::config::EtaGapConfig;
use crate::ensemble::Ensemble;
use crate::gaps::{gap_label, gap_passes};

/// Runs the two-particle eta-gap correlator over the ensemble.
///
/// Every unordered pair contributes cos/sin of twice and three times its
/// azimuthal difference to each threshold its pseudorapidity separation
/// passes. The thresholds are ascending, so the per-pair scan stops at
/// the first failing one. Thresholds that collected at least one pair
/// write their four normalized means into the `etagap-{c2,c3,s2,s3}-XX`
/// profiles keyed by the event multiplicity; empty thresholds write
/// nothing.
///
/// Returns the per-threshold pair counts as a diagnostic.
pub fn run_eta_gap(
    ensemble: &Ensemble,
    config: &EtaGapConfig,
    store: &mut AccumulatorStore,
) -> Result<Vec<u64>, AfcError> {
    let thresholds = &config.thresholds;
    let mut c2 = vec![0.0f64; thresholds.len()];
    let mut c3 = vec![0.0f64; thresholds.len()];
    let mut s2 = vec![0.0f64; thresholds.len()];
    let mut s3 = vec![0.0f64; thresholds.len()];
    let mut counts = vec![0u64; thresholds.len()];

    let tracks = ensemble.tracks();
    for (i, p1) in tracks.iter().enumerate() {
        for p2 in &tracks[i + 1..] {
            let dphi = p1.phi - p2.phi;
            let deta = (p1.eta - p2.eta).abs();
            let c2v = (2.0 * dphi).cos();
            let s2v = (2.0 * dphi).sin();
            let c3v = (3.0 * dphi).cos();
            let s3v = (3.0 * dphi).sin();
            for (k, &threshold) in thresholds.iter().enumerate() {
                if !gap_passes(deta, threshold) {
                    // ascending table: every larger threshold fails too
                    break;
                }
                c2[k] += c2v;
                c3[k] += c3v;
                s2[k] += s2v;
                s3[k] += s3v;
                counts[k] += 1;
            }
        }
    }

    let m = ensemble.len() as u32;
    for (k, &threshold) in thresholds.iter().enumerate() {
        if counts[k] == 0 {
            continue;
        }
        let label = gap_label(threshold);
        let weight = counts[k] as f64;
        store.fill_profile(&format!("etagap-c2-{label}"), m, c2[k] / weight)?;
        store.fill_profile(&format!("etagap-c3-{label}"), m, c3[k] / weight)?;
        store.fill_profile(&format!("etagap-s2-{label}"), m, s2[k] / weight)?;
        store.fill_profile(&format!("etagap-s3-{label}"), m, s3[k] / weight)?;
    }
    Ok(counts)
}
