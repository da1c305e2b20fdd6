use pdfdiff_core::Config;
use pdfdiff_core::config_file::ConfigFile;

pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Shared application state accessible from all handlers.
pub struct AppState {
    /// Base configuration; a request may override the granularity.
    pub config: Config,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build state from the config file cascade plus the raw
    /// `PDFDIFF_GRANULARITY` value, which wins over the file.
    pub fn from_config_file(file_config: &ConfigFile, env_granularity: Option<&str>) -> Self {
        let config = file_config.resolve(env_granularity, None);
        let max_upload_mb = file_config
            .max_upload_mb()
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Self {
            config,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        }
    }

    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes / (1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfdiff_core::Granularity;
    use pdfdiff_core::config_file::{SegmentationConfig, ServerConfig};

    fn file_config() -> ConfigFile {
        ConfigFile {
            segmentation: Some(SegmentationConfig {
                granularity: Some(Granularity::Line),
                min_segment_chars: None,
            }),
            server: Some(ServerConfig {
                bind: None,
                max_upload_mb: Some(8),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_without_config() {
        let state = AppState::from_config_file(&ConfigFile::default(), None);
        assert_eq!(state.config.segmentation.granularity, Granularity::Paragraph);
        assert_eq!(state.max_upload_mb(), DEFAULT_MAX_UPLOAD_MB);
    }

    #[test]
    fn test_file_values_apply() {
        let state = AppState::from_config_file(&file_config(), None);
        assert_eq!(state.config.segmentation.granularity, Granularity::Line);
        assert_eq!(state.max_upload_bytes, 8 * 1024 * 1024);
    }

    #[test]
    fn test_env_granularity_beats_file() {
        let state = AppState::from_config_file(&file_config(), Some("sentence"));
        assert_eq!(state.config.segmentation.granularity, Granularity::Sentence);
    }

    #[test]
    fn test_invalid_env_granularity_is_ignored() {
        let state = AppState::from_config_file(&file_config(), Some("chapter"));
        assert_eq!(state.config.segmentation.granularity, Granularity::Line);
    }
}
