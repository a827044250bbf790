use afc_core::errors::{AfcError, ErrorInfo};
use afc_core::track::{RawTrack, Track};
use serde::{Deserialize, Serialize};

use crate::config::CumulantsConfig;

/// Maximum number of tracks retained for one event.
pub const ENSEMBLE_CAPACITY: usize = 9999;

/// The filtered set of tracks considered for one event's correlators.
///
/// The backing storage is reused across events; [`Ensemble::begin_event`]
/// drops the previous event's content entirely, so no particle data ever
/// leaks between events.
#[derive(Debug, Clone)]
pub struct Ensemble {
    tracks: Vec<Track>,
}

impl Ensemble {
    /// Creates an empty ensemble with full capacity reserved.
    pub fn new() -> Self {
        Self {
            tracks: Vec::with_capacity(ENSEMBLE_CAPACITY),
        }
    }

    /// Clears the previous event's content.
    pub fn begin_event(&mut self) {
        self.tracks.clear();
    }

    /// Appends a track, failing when the fixed capacity is exhausted.
    ///
    /// Overflow is a fatal precondition violation: configured input
    /// limits must keep events below the capacity.
    pub fn push(&mut self, track: Track) -> Result<(), AfcError> {
        if self.tracks.len() == ENSEMBLE_CAPACITY {
            return Err(AfcError::Ensemble(
                ErrorInfo::new("capacity-exceeded", "event exceeds the ensemble capacity")
                    .with_context("capacity", ENSEMBLE_CAPACITY.to_string()),
            ));
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Returns the current multiplicity M.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns true when the ensemble holds no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Returns the retained tracks.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

impl Default for Ensemble {
    fn default() -> Self {
        Self::new()
    }
}

/// Multiplicities recorded at each filtering stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCounts {
    /// Entries that resolved to a track record, before any cut.
    pub raw: u32,
    /// Entries surviving the pseudorapidity acceptance window.
    pub accepted: u32,
    /// Entries additionally surviving the transverse-momentum window;
    /// the final ensemble multiplicity.
    pub selected: u32,
}

/// Outcome of building one event's ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Multiplicity counters at each filtering stage.
    pub counts: SelectionCounts,
    /// Diagnostics for entries that could not be resolved; such entries
    /// are excluded from every counter.
    pub skipped: Vec<ErrorInfo>,
}

/// Filters a raw particle list into the ensemble.
///
/// Unresolvable entries are skipped with a diagnostic and excluded from
/// all counts. When `apply_kin_cuts` is unset, the acceptance and
/// momentum windows are bypassed and the acceptance counter stays at
/// zero, matching the counter semantics of the reference analysis.
pub fn build_ensemble(
    ensemble: &mut Ensemble,
    raw_tracks: &[RawTrack],
    apply_kin_cuts: bool,
    config: &CumulantsConfig,
) -> Result<BuildReport, AfcError> {
    ensemble.begin_event();
    let mut counts = SelectionCounts::default();
    let mut skipped = Vec::new();
    for raw in raw_tracks {
        let track = match raw.resolve() {
            Ok(track) => track,
            Err(err) => {
                skipped.push(err.info().clone());
                continue;
            }
        };
        counts.raw += 1;
        if apply_kin_cuts {
            if track.eta < config.eta_min || track.eta > config.eta_max {
                continue;
            }
            counts.accepted += 1;
            if track.pt < config.pt_min || track.pt > config.pt_max {
                continue;
            }
        }
        ensemble.push(track)?;
        counts.selected += 1;
    }
    Ok(BuildReport { counts, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reco(pt: f64, eta: f64, phi: f64) -> RawTrack {
        RawTrack::Reco {
            pt,
            eta,
            phi,
            charge: 1,
        }
    }

    #[test]
    fn cuts_produce_staged_counts() {
        let config = CumulantsConfig::default();
        let mut ensemble = Ensemble::new();
        let raw = vec![
            reco(1.0, 0.0, 0.1),  // survives everything
            reco(1.0, 2.0, 0.2),  // fails the eta window
            reco(10.0, 0.5, 0.3), // fails the pt window
        ];
        let report = build_ensemble(&mut ensemble, &raw, true, &config).expect("build");
        assert_eq!(report.counts.raw, 3);
        assert_eq!(report.counts.accepted, 2);
        assert_eq!(report.counts.selected, 1);
        assert_eq!(ensemble.len(), 1);
    }

    #[test]
    fn disabled_cuts_keep_every_resolved_entry() {
        let config = CumulantsConfig::default();
        let mut ensemble = Ensemble::new();
        let raw = vec![reco(10.0, 4.0, 0.0), reco(0.1, -3.0, 1.0)];
        let report = build_ensemble(&mut ensemble, &raw, false, &config).expect("build");
        assert_eq!(report.counts.raw, 2);
        assert_eq!(report.counts.accepted, 0);
        assert_eq!(report.counts.selected, 2);
    }

    #[test]
    fn unresolvable_entries_are_skipped_with_diagnostics() {
        let config = CumulantsConfig::default();
        let mut ensemble = Ensemble::new();
        let raw = vec![
            reco(1.0, 0.0, 0.0),
            RawTrack::Gen {
                px: 0.0,
                py: 0.0,
                pz: 5.0,
                charge: 1,
            },
        ];
        let report = build_ensemble(&mut ensemble, &raw, true, &config).expect("build");
        assert_eq!(report.counts.raw, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].code, "vanishing-pt");
    }

    #[test]
    fn new_event_overwrites_previous_content() {
        let config = CumulantsConfig::default();
        let mut ensemble = Ensemble::new();
        build_ensemble(&mut ensemble, &[reco(1.0, 0.0, 0.0)], true, &config).expect("build");
        assert_eq!(ensemble.len(), 1);
        build_ensemble(&mut ensemble, &[], true, &config).expect("build");
        assert!(ensemble.is_empty());
    }
}
