//! Per-event particle records and their upstream source representations.

use serde::{Deserialize, Serialize};

use crate::errors::{AfcError, ErrorInfo};

fn track_error(code: &str, message: impl Into<String>) -> AfcError {
    AfcError::Track(ErrorInfo::new(code, message))
}

/// Normalizes an azimuthal angle into `[0, 2pi)`.
pub fn phi_0_2pi(phi: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let mut wrapped = phi % tau;
    if wrapped < 0.0 {
        wrapped += tau;
    }
    if wrapped >= tau {
        wrapped -= tau;
    }
    wrapped
}

/// Immutable particle record consumed by every correlator.
///
/// Constructed once per event from a [`RawTrack`] and never mutated
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Transverse momentum, non-negative.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle in `[0, 2pi)`.
    pub phi: f64,
    /// Charge sign: -1, 0 or +1.
    pub charge: i8,
}

/// Raw per-event entry in one of the supported source representations.
///
/// The two variants are interchangeable once resolved; resolution happens
/// exactly once at ingestion so no downstream code inspects the source
/// kind again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RawTrack {
    /// Detector-level track already carrying kinematic coordinates.
    Reco {
        /// Transverse momentum.
        pt: f64,
        /// Pseudorapidity.
        eta: f64,
        /// Azimuthal angle, any real value.
        phi: f64,
        /// Signed charge.
        charge: i8,
    },
    /// Generator-level particle carrying Cartesian momentum components.
    Gen {
        /// Momentum along x.
        px: f64,
        /// Momentum along y.
        py: f64,
        /// Momentum along z.
        pz: f64,
        /// Signed charge.
        charge: i8,
    },
}

impl RawTrack {
    /// Resolves the entry into a [`Track`] record.
    ///
    /// Fails with a non-fatal `Track` error when the entry cannot define
    /// the record: non-finite values, negative transverse momentum, or a
    /// generator-level particle with vanishing transverse momentum (its
    /// pseudorapidity and azimuth are undefined). Callers skip such
    /// entries and continue.
    pub fn resolve(&self) -> Result<Track, AfcError> {
        match *self {
            RawTrack::Reco {
                pt,
                eta,
                phi,
                charge,
            } => {
                if !pt.is_finite() || !eta.is_finite() || !phi.is_finite() {
                    return Err(track_error("non-finite-track", "track coordinates not finite"));
                }
                if pt < 0.0 {
                    return Err(AfcError::Track(
                        ErrorInfo::new("negative-pt", "transverse momentum below zero")
                            .with_context("pt", format!("{pt}")),
                    ));
                }
                Ok(Track {
                    pt,
                    eta,
                    phi: phi_0_2pi(phi),
                    charge: charge.signum(),
                })
            }
            RawTrack::Gen { px, py, pz, charge } => {
                if !px.is_finite() || !py.is_finite() || !pz.is_finite() {
                    return Err(track_error("non-finite-momentum", "momentum components not finite"));
                }
                let pt = px.hypot(py);
                if pt <= 0.0 {
                    return Err(track_error(
                        "vanishing-pt",
                        "transverse momentum vanishes, eta and phi undefined",
                    ));
                }
                Ok(Track {
                    pt,
                    eta: (pz / pt).asinh(),
                    phi: phi_0_2pi(py.atan2(px)),
                    charge: charge.signum(),
                })
            }
        }
    }
}
