use afc_core::errors::{AfcError, ErrorInfo};
use serde::{Deserialize, Serialize};

fn config_error(code: &str, message: impl Into<String>) -> AfcError {
    AfcError::Config(ErrorInfo::new(code, message))
}

/// YAML-configurable parameters governing the correlator engine.
///
/// A feature section being present enables the corresponding method;
/// absent sections leave it off. Defaults reproduce the standard
/// analysis setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulantsConfig {
    /// Lower edge of the pseudorapidity acceptance window.
    #[serde(default = "default_eta_min")]
    pub eta_min: f64,
    /// Upper edge of the pseudorapidity acceptance window.
    #[serde(default = "default_eta_max")]
    pub eta_max: f64,
    /// Lower edge of the transverse-momentum window.
    #[serde(default = "default_pt_min")]
    pub pt_min: f64,
    /// Upper edge of the transverse-momentum window.
    #[serde(default = "default_pt_max")]
    pub pt_max: f64,
    /// Minimum multiplicity required before any correlator runs.
    #[serde(default = "default_min_mult")]
    pub min_mult: u32,
    /// Eta-gap pairwise correlator settings (enabled when present).
    #[serde(default)]
    pub eta_gap: Option<EtaGapConfig>,
    /// Flow-vector cumulant settings (enabled when present).
    #[serde(default)]
    pub qc: Option<QcConfig>,
    /// Four-nested-loop direct correlator settings (enabled when present).
    #[serde(default)]
    pub nl4: Option<Nl4Config>,
    /// Three-nested-loop direct correlator settings (enabled when present).
    #[serde(default)]
    pub nl3: Option<Nl3Config>,
    /// Reserved gapped-correlator extension point (currently a no-op).
    #[serde(default = "default_gapped")]
    pub gapped: Option<GappedConfig>,
}

fn default_eta_min() -> f64 {
    -1.0
}

fn default_eta_max() -> f64 {
    1.0
}

fn default_pt_min() -> f64 {
    0.3
}

fn default_pt_max() -> f64 {
    3.0
}

fn default_min_mult() -> u32 {
    10
}

fn default_gapped() -> Option<GappedConfig> {
    Some(GappedConfig::default())
}

impl Default for CumulantsConfig {
    fn default() -> Self {
        Self {
            eta_min: default_eta_min(),
            eta_max: default_eta_max(),
            pt_min: default_pt_min(),
            pt_max: default_pt_max(),
            min_mult: default_min_mult(),
            eta_gap: None,
            qc: None,
            nl4: None,
            nl3: None,
            gapped: default_gapped(),
        }
    }
}

impl CumulantsConfig {
    /// Parses a configuration from YAML text and validates it.
    pub fn from_yaml(text: &str) -> Result<Self, AfcError> {
        let config: CumulantsConfig = serde_yaml::from_str(text)
            .map_err(|err| AfcError::Serde(ErrorInfo::new("config-yaml", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks window ordering and per-feature tables.
    pub fn validate(&self) -> Result<(), AfcError> {
        if !(self.eta_min < self.eta_max) {
            return Err(config_error("eta-window", "eta_min must lie below eta_max"));
        }
        if !(self.pt_min < self.pt_max) {
            return Err(config_error("pt-window", "pt_min must lie below pt_max"));
        }
        if self.pt_min < 0.0 {
            return Err(config_error("pt-window", "pt_min must be non-negative"));
        }
        if let Some(eta_gap) = &self.eta_gap {
            eta_gap.validate()?;
        }
        if let Some(qc) = &self.qc {
            qc.validate()?;
        }
        if let Some(gapped) = &self.gapped {
            if !(gapped.eta_low < gapped.eta_high) {
                return Err(config_error(
                    "gapped-window",
                    "eta_low must lie below eta_high",
                ));
            }
        }
        Ok(())
    }
}

/// Ascending pseudorapidity-separation thresholds for the pairwise
/// correlator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtaGapConfig {
    /// Ascending separation thresholds; a non-positive entry imposes no
    /// separation requirement.
    #[serde(default = "default_eg_thresholds")]
    pub thresholds: Vec<f64>,
}

fn default_eg_thresholds() -> Vec<f64> {
    vec![
        0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 2.0, 2.5,
    ]
}

impl Default for EtaGapConfig {
    fn default() -> Self {
        Self {
            thresholds: default_eg_thresholds(),
        }
    }
}

impl EtaGapConfig {
    fn validate(&self) -> Result<(), AfcError> {
        if self.thresholds.is_empty() {
            return Err(config_error("eta-gap-table", "threshold table is empty"));
        }
        if self.thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(config_error(
                "eta-gap-table",
                "thresholds must be strictly ascending",
            ));
        }
        Ok(())
    }
}

/// Flow-vector cumulant settings.
///
/// `harmonics` selects which harmonic orders are measured: the raw
/// flow-vector components are written for enabled orders, harmonic 2
/// carries the 2-, 4- and 6-particle estimators and harmonic 3 the 2-
/// and 4-particle ones. Auxiliary flow vectors entering a bias
/// correction are always computed internally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcConfig {
    /// Harmonic orders to measure, each within 2..=6.
    #[serde(default = "default_harmonics")]
    pub harmonics: Vec<u8>,
    /// Whether to repeat the computation per charge sign.
    #[serde(default = "default_charge_split")]
    pub charge_split: bool,
}

fn default_harmonics() -> Vec<u8> {
    vec![2, 3, 4, 5, 6]
}

fn default_charge_split() -> bool {
    true
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            harmonics: default_harmonics(),
            charge_split: default_charge_split(),
        }
    }
}

impl QcConfig {
    /// Returns true when the given harmonic order is enabled.
    pub fn has_harmonic(&self, order: u8) -> bool {
        self.harmonics.contains(&order)
    }

    fn validate(&self) -> Result<(), AfcError> {
        if self.harmonics.is_empty() {
            return Err(config_error("qc-harmonics", "harmonic list is empty"));
        }
        if let Some(&bad) = self.harmonics.iter().find(|n| !(2..=6).contains(*n)) {
            return Err(config_error(
                "qc-harmonics",
                format!("harmonic order {bad} outside the supported range 2..=6"),
            ));
        }
        Ok(())
    }
}

/// Four-nested-loop direct correlator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nl4Config {
    /// Multiplicity ceiling above which the method is skipped.
    #[serde(default = "default_nl4_max_mult")]
    pub max_mult: u32,
    /// Minimum pseudorapidity separation required of every tuple leg.
    #[serde(default)]
    pub min_gap: f64,
}

fn default_nl4_max_mult() -> u32 {
    50
}

impl Default for Nl4Config {
    fn default() -> Self {
        Self {
            max_mult: default_nl4_max_mult(),
            min_gap: 0.0,
        }
    }
}

/// Three-nested-loop direct correlator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nl3Config {
    /// Multiplicity ceiling above which the method is skipped.
    #[serde(default = "default_nl3_max_mult")]
    pub max_mult: u32,
    /// Minimum pseudorapidity separation required of every pair leg.
    #[serde(default)]
    pub min_gap: f64,
}

fn default_nl3_max_mult() -> u32 {
    100
}

impl Default for Nl3Config {
    fn default() -> Self {
        Self {
            max_mult: default_nl3_max_mult(),
            min_gap: 0.0,
        }
    }
}

/// Reserved extension point for a gapped four-particle correlator.
///
/// Dispatched as a no-op; the window is retained for the eventual
/// implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GappedConfig {
    /// Lower pseudorapidity edge of the gap window.
    #[serde(default = "default_gapped_low")]
    pub eta_low: f64,
    /// Upper pseudorapidity edge of the gap window.
    #[serde(default = "default_gapped_high")]
    pub eta_high: f64,
}

fn default_gapped_low() -> f64 {
    -0.5
}

fn default_gapped_high() -> f64 {
    0.5
}

impl Default for GappedConfig {
    fn default() -> Self {
        Self {
            eta_low: default_gapped_low(),
            eta_high: default_gapped_high(),
        }
    }
}
