use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Config, Granularity};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub segmentation: Option<SegmentationConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub server: Option<ServerConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    pub granularity: Option<Granularity>,
    pub min_segment_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub header_exclusion: Option<f32>,
    pub footer_exclusion: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub max_upload_mb: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
}

/// Environment variable that overrides the configured granularity.
pub const GRANULARITY_ENV: &str = "PDFDIFF_GRANULARITY";

/// Platform config directory path: `<config_dir>/pdfdiff/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfdiff").join("config.toml"))
}

/// Load config by cascading CWD `.pdfdiff.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdfdiff.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        segmentation: Some(SegmentationConfig {
            granularity: overlay
                .segmentation
                .as_ref()
                .and_then(|s| s.granularity)
                .or_else(|| base.segmentation.as_ref().and_then(|s| s.granularity)),
            min_segment_chars: overlay
                .segmentation
                .as_ref()
                .and_then(|s| s.min_segment_chars)
                .or_else(|| {
                    base.segmentation
                        .as_ref()
                        .and_then(|s| s.min_segment_chars)
                }),
        }),
        extraction: Some(ExtractionConfig {
            header_exclusion: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.header_exclusion)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.header_exclusion)),
            footer_exclusion: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.footer_exclusion)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.footer_exclusion)),
        }),
        server: Some(ServerConfig {
            bind: overlay
                .server
                .as_ref()
                .and_then(|s| s.bind.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.bind.clone())),
            max_upload_mb: overlay
                .server
                .as_ref()
                .and_then(|s| s.max_upload_mb)
                .or_else(|| base.server.as_ref().and_then(|s| s.max_upload_mb)),
        }),
        display: Some(DisplayConfig {
            color: overlay
                .display
                .as_ref()
                .and_then(|d| d.color)
                .or_else(|| base.display.as_ref().and_then(|d| d.color)),
        }),
    }
}

impl ConfigFile {
    /// Apply the file's values on top of `config`; unset fields leave it untouched.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(seg) = &self.segmentation {
            if let Some(g) = seg.granularity {
                config.segmentation.granularity = g;
            }
            if let Some(min) = seg.min_segment_chars {
                config.segmentation.min_segment_chars = min;
            }
        }
        if let Some(ext) = &self.extraction {
            if ext.header_exclusion.is_some() {
                config.header_exclusion = ext.header_exclusion.filter(|r| *r > 0.0);
            }
            if ext.footer_exclusion.is_some() {
                config.footer_exclusion = ext.footer_exclusion.filter(|r| *r > 0.0);
            }
        }
    }

    /// Resolve into a [`Config`], starting from defaults.
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();
        self.apply_to(&mut config);
        config
    }

    /// Resolve the effective config with overrides applied.
    ///
    /// Precedence: `flag` > `env_granularity` (the raw [`GRANULARITY_ENV`]
    /// value) > this file > defaults. An unparseable environment value is
    /// ignored with a warning.
    pub fn resolve(&self, env_granularity: Option<&str>, flag: Option<Granularity>) -> Config {
        let mut config = self.to_config();
        if let Some(value) = env_granularity {
            match value.parse::<Granularity>() {
                Ok(g) => config.segmentation.granularity = g,
                Err(e) => tracing::warn!(value = %value, error = %e, "ignoring {}", GRANULARITY_ENV),
            }
        }
        if let Some(g) = flag {
            config.segmentation.granularity = g;
        }
        config
    }

    pub fn bind_address(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.bind.as_deref())
    }

    pub fn max_upload_mb(&self) -> Option<usize> {
        self.server.as_ref().and_then(|s| s.max_upload_mb)
    }

    pub fn color(&self) -> Option<bool> {
        self.display.as_ref().and_then(|d| d.color)
    }
}
