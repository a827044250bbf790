use afc_core::{AfcError, Complex};
use afc_stat::AccumulatorStore;

use crate::config::{Nl3Config, Nl4Config};
use crate::ensemble::Ensemble;
use crate::gaps::{gap_label, gap_passes, NL_GAP_BINS};

/// Runs the four-nested-loop direct correlator.
///
/// Enumerates every ordered 4-tuple of distinct tracks; a tuple
/// contributes cos(2(phi1 + phi2 - phi3 - phi4)) to each gap bin that
/// all six pairwise pseudorapidity separations pass, on top of the
/// global minimum-gap filter applied to every leg. Per-bin means are
/// written to the `nl4-qc4-gXX` profiles keyed by multiplicity. Skipped
/// entirely above the configured multiplicity ceiling; the cost is
/// O(M^4).
pub fn run_nl4(
    ensemble: &Ensemble,
    config: &Nl4Config,
    store: &mut AccumulatorStore,
) -> Result<(), AfcError> {
    let m = ensemble.len();
    if m as u32 > config.max_mult {
        return Ok(());
    }
    let min_gap = config.min_gap;
    let tracks = ensemble.tracks();
    let mut sums = [0.0f64; NL_GAP_BINS.len()];
    let mut counts = [0u64; NL_GAP_BINS.len()];

    for (i1, p1) in tracks.iter().enumerate() {
        for (i2, p2) in tracks.iter().enumerate() {
            if i2 == i1 {
                continue;
            }
            let eta12 = (p1.eta - p2.eta).abs();
            if !gap_passes(eta12, min_gap) {
                continue;
            }
            for (i3, p3) in tracks.iter().enumerate() {
                if i3 == i2 || i3 == i1 {
                    continue;
                }
                let eta13 = (p1.eta - p3.eta).abs();
                if !gap_passes(eta13, min_gap) {
                    continue;
                }
                let eta23 = (p2.eta - p3.eta).abs();
                if !gap_passes(eta23, min_gap) {
                    continue;
                }
                for (i4, p4) in tracks.iter().enumerate() {
                    if i4 == i3 || i4 == i2 || i4 == i1 {
                        continue;
                    }
                    let eta14 = (p1.eta - p4.eta).abs();
                    let eta24 = (p2.eta - p4.eta).abs();
                    let eta34 = (p3.eta - p4.eta).abs();
                    if !gap_passes(eta14, min_gap)
                        || !gap_passes(eta24, min_gap)
                        || !gap_passes(eta34, min_gap)
                    {
                        continue;
                    }
                    let arg = p1.phi + p2.phi - p3.phi - p4.phi;
                    let value = (2.0 * arg).cos();
                    let min_sep = eta12
                        .min(eta13)
                        .min(eta14)
                        .min(eta23)
                        .min(eta24)
                        .min(eta34);
                    for (bin, &gap) in NL_GAP_BINS.iter().enumerate() {
                        if !gap_passes(min_sep, gap) {
                            break;
                        }
                        sums[bin] += value;
                        counts[bin] += 1;
                    }
                }
            }
        }
    }

    let mult = m as u32;
    for (bin, &gap) in NL_GAP_BINS.iter().enumerate() {
        if counts[bin] == 0 {
            continue;
        }
        let label = gap_label(gap);
        store.fill_profile(
            &format!("nl4-qc4-g{label}"),
            mult,
            sums[bin] / counts[bin] as f64,
        )?;
    }
    Ok(())
}

/// Runs the four-particle correlator via three nested loops.
///
/// Per gap bin, running 2-particle sums (second and fourth harmonic)
/// and a combined 3-particle sum are accumulated and recombined through
/// the closed-form correction Re(nq2^2 - nq4 - nq3) / (np^2 - ns),
/// which removes the self-correlation terms of the squared pair sum for
/// the nested-loop counting scheme. The combination is an external
/// reference derivation and is kept as given; its agreement with the
/// flow-vector estimator at small multiplicity is the correctness
/// check. Results go to the `nl3-qc4-gXX` profiles keyed by
/// multiplicity. Skipped above the ceiling; the cost is O(M^3).
pub fn run_nl3(
    ensemble: &Ensemble,
    config: &Nl3Config,
    store: &mut AccumulatorStore,
) -> Result<(), AfcError> {
    let m = ensemble.len();
    if m as u32 > config.max_mult {
        return Ok(());
    }
    let min_gap = config.min_gap;
    let tracks = ensemble.tracks();
    let mut nq2 = [Complex::zero(); NL_GAP_BINS.len()];
    let mut nq3 = [Complex::zero(); NL_GAP_BINS.len()];
    let mut nq4 = [Complex::zero(); NL_GAP_BINS.len()];
    let mut np = [0u64; NL_GAP_BINS.len()];
    let mut ns = [0u64; NL_GAP_BINS.len()];

    for (i1, p1) in tracks.iter().enumerate() {
        for (i2, p2) in tracks.iter().enumerate() {
            if i2 == i1 {
                continue;
            }
            let eta12 = (p1.eta - p2.eta).abs();
            if !gap_passes(eta12, min_gap) {
                continue;
            }
            let dphi12 = p1.phi - p2.phi;
            let v2 = Complex::unit(2.0 * dphi12);
            let v4 = Complex::new(1.0 + (4.0 * dphi12).cos(), (4.0 * dphi12).sin());
            for (bin, &gap) in NL_GAP_BINS.iter().enumerate() {
                if !gap_passes(eta12, gap) {
                    break;
                }
                nq2[bin] += v2;
                nq4[bin] += v4;
                np[bin] += 1;
                ns[bin] += 2;
            }
            for (i3, p3) in tracks.iter().enumerate() {
                if i3 == i1 || i3 == i2 {
                    continue;
                }
                let eta13 = (p1.eta - p3.eta).abs();
                if !gap_passes(eta13, min_gap) {
                    continue;
                }
                let eta23 = (p2.eta - p3.eta).abs();
                if !gap_passes(eta23, min_gap) {
                    continue;
                }
                let dphi13 = p1.phi - p3.phi;
                let t1 = 2.0 * (2.0 * (dphi12 + dphi13)).cos() + 2.0 * (2.0 * (dphi12 - dphi13)).cos();
                let t2 = 2.0 * (2.0 * (dphi12 + dphi13)).sin() + 2.0 * (2.0 * (dphi12 - dphi13)).sin();
                let value = Complex::new(t1, t2);
                // the triple's bin gate checks only the legs to p3
                let min_sep = eta13.min(eta23);
                for (bin, &gap) in NL_GAP_BINS.iter().enumerate() {
                    if !gap_passes(min_sep, gap) {
                        break;
                    }
                    nq3[bin] += value;
                    ns[bin] += 4;
                }
            }
        }
    }

    let mult = m as u32;
    for (bin, &gap) in NL_GAP_BINS.iter().enumerate() {
        let denom = (np[bin] * np[bin]) as i64 - ns[bin] as i64;
        if denom <= 0 {
            continue;
        }
        let numer = (nq2[bin] * nq2[bin] - nq4[bin] - nq3[bin]).re;
        let label = gap_label(gap);
        store.fill_profile(&format!("nl3-qc4-g{label}"), mult, numer / denom as f64)?;
    }
    Ok(())
}
