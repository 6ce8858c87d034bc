use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Extensions probed by default (lower-case, no leading dot)
pub const DEFAULT_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov", "ts", "rmvb"];

/// Configuration for the TrueHD/VF file test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTestConfig {
    /// Library root directories walked by `scan`
    pub library_roots: Vec<PathBuf>,
    /// File extensions that pass the extension gate
    pub extensions: Vec<String>,
    /// ffprobe binary (or the entrypoint name inside the docker image)
    pub ffprobe_bin: PathBuf,
    /// Seconds before a probe is killed; 0 waits forever
    pub probe_timeout_secs: u64,
    /// Docker image to run ffprobe in, if any
    pub docker_image: Option<String>,
    /// Path to docker binary
    pub docker_bin: PathBuf,
}

impl Default for FileTestConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl FileTestConfig {
    /// Create a default configuration with sensible values
    pub fn default_config() -> Self {
        Self {
            library_roots: vec![PathBuf::from("/media")],
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ffprobe_bin: PathBuf::from("ffprobe"),
            probe_timeout_secs: 60,
            docker_image: None,
            docker_bin: PathBuf::from("docker"),
        }
    }

    /// Load configuration from a file, or return defaults if path is None or file doesn't exist
    pub fn load_config(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default_config();

        if let Some(config_path) = path {
            if config_path.exists() {
                let content = std::fs::read_to_string(config_path)
                    .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

                config = Self::parse(config_path, &content)?;
            }
        }

        Ok(config)
    }

    fn parse(config_path: &Path, content: &str) -> Result<Self> {
        if config_path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", config_path.display()))
        } else {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", config_path.display()))
        }
    }

    /// Check whether an extension (without dot) is on the allow list, ignoring case
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_video_extensions() {
        let cfg = FileTestConfig::default_config();
        for ext in ["mkv", "MP4", "avi", "Mov", "ts", "rmvb"] {
            assert!(cfg.allows_extension(ext), "{} should be allowed", ext);
        }
        assert!(!cfg.allows_extension("m4v"));
        assert!(!cfg.allows_extension("srt"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let cfg = FileTestConfig::load_config(Some(Path::new("/nonexistent/filetest.toml"))).unwrap();
        assert_eq!(cfg.ffprobe_bin, PathBuf::from("ffprobe"));
        assert_eq!(cfg.probe_timeout_secs, 60);
        assert!(cfg.docker_image.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = FileTestConfig::parse(
            Path::new("filetest.toml"),
            "probe_timeout_secs = 5\ndocker_image = \"lscr.io/linuxserver/ffmpeg:latest\"\n",
        )
        .unwrap();
        assert_eq!(cfg.probe_timeout_secs, 5);
        assert_eq!(cfg.docker_image.as_deref(), Some("lscr.io/linuxserver/ffmpeg:latest"));
        assert_eq!(cfg.extensions.len(), DEFAULT_EXTENSIONS.len());
    }

    #[test]
    fn test_json_config_with_dotted_extensions() {
        let cfg = FileTestConfig::parse(
            Path::new("filetest.json"),
            r#"{"extensions": [".MKV", "m2ts"], "library_roots": ["/srv/films"]}"#,
        )
        .unwrap();
        assert!(cfg.allows_extension("mkv"));
        assert!(cfg.allows_extension("M2TS"));
        assert!(!cfg.allows_extension("mp4"));
        assert_eq!(cfg.library_roots, vec![PathBuf::from("/srv/films")]);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = FileTestConfig::parse(Path::new("filetest.json"), "{ not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON config"));
    }
}
