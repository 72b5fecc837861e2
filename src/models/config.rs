use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use stipple_dither::{AdjustmentParams, Algorithm, AlgorithmParams, ColorMode, DitherError};

/// Application configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Number of independent dither workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub limits: LimitsConfig,

    /// Defaults for `/api/detect` and the `detect` command
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Named algorithm + parameter bundles
    #[serde(default = "default_presets")]
    pub presets: BTreeMap<String, Preset>,
}

fn default_workers() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest decoded image accepted, in pixels
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,

    /// Largest request body accepted by the HTTP API
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Most regions a single selective request may carry
    #[serde(default = "default_max_regions")]
    pub max_regions: usize,

    /// Largest image, in pixels, that direct binary search will run on
    #[serde(default = "default_max_dbs_pixels")]
    pub max_dbs_pixels: u64,
}

fn default_max_pixels() -> u64 {
    40_000_000
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_max_regions() -> usize {
    32
}

fn default_max_dbs_pixels() -> u64 {
    1_000_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pixels: default_max_pixels(),
            max_body_bytes: default_max_body_bytes(),
            max_regions: default_max_regions(),
            max_dbs_pixels: default_max_dbs_pixels(),
        }
    }
}

impl LimitsConfig {
    pub fn check_regions(&self, count: usize) -> Result<(), DitherError> {
        if count > self.max_regions {
            return Err(DitherError::InvalidParameter {
                name: "regions",
                reason: format!("{count} regions exceed the limit of {}", self.max_regions),
            });
        }
        Ok(())
    }

    /// Direct binary search is quadratic-ish per sweep, so it gets its own
    /// pixel ceiling below `max_pixels`.
    pub fn check_dbs<I>(&self, algorithms: I, pixels: u64) -> Result<(), DitherError>
    where
        I: IntoIterator<Item = Algorithm>,
    {
        let uses_dbs = algorithms
            .into_iter()
            .any(|algorithm| algorithm == Algorithm::DirectBinarySearch);
        if uses_dbs && pixels > self.max_dbs_pixels {
            return Err(DitherError::InvalidParameter {
                name: "algorithm",
                reason: format!(
                    "directBinarySearch is limited to {} pixels, image has {pixels}",
                    self.max_dbs_pixels
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,

    #[serde(default = "default_min_size")]
    pub min_size: usize,
}

fn default_sensitivity() -> f32 {
    30.0
}

fn default_min_size() -> usize {
    500
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            min_size: default_min_size(),
        }
    }
}

/// A stored algorithm choice with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub algorithm: Algorithm,

    #[serde(default)]
    pub params: AlgorithmParams,

    #[serde(default)]
    pub adjustments: AdjustmentParams,
}

impl Preset {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            params: AlgorithmParams::default(),
            adjustments: AdjustmentParams::default(),
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}

fn default_presets() -> BTreeMap<String, Preset> {
    let mut presets = BTreeMap::new();
    presets.insert("classic".to_string(), Preset::new(Algorithm::FloydSteinberg));
    presets.insert("print".to_string(), Preset::new(Algorithm::Atkinson));

    let mut newspaper = Preset::new(Algorithm::Halftone);
    newspaper.params.dot_size = 4;
    newspaper.params.spacing = 2.0;
    newspaper.adjustments.contrast = 20.0;
    presets.insert("newspaper".to_string(), newspaper);

    let mut cmyk = Preset::new(Algorithm::Halftone);
    cmyk.params.color_mode = ColorMode::Cmyk;
    presets.insert("cmyk-halftone".to_string(), cmyk);

    let mut tones = Preset::new(Algorithm::MultiTone);
    tones.params.tone_levels = 4;
    presets.insert("gray-tones".to_string(), tones);

    presets
}

impl AppConfig {
    /// Load configuration from `path`, or return defaults when no path is
    /// given. Read and parse failures are logged and fall back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("No config file given, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        workers = config.workers,
                        presets = config.presets.len(),
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Worker count, never below one.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            workers: default_workers(),
            limits: LimitsConfig::default(),
            detection: DetectionConfig::default(),
            presets: default_presets(),
        }
    }
}
