use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use crate::config::FileTestConfig;

/// Audio-only ffprobe output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Option<Vec<ProbeStream>>,
}

/// One audio stream as reported by ffprobe.
///
/// Codec and tag values are kept as raw JSON so that odd metadata (numbers,
/// nulls) survives parsing and is normalized away later instead of failing the probe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub index: Option<i64>,
    #[serde(rename = "codec_name")]
    pub codec_name: Option<Value>,
    pub tags: Option<HashMap<String, Value>>,
}

impl ProbeStream {
    /// Look up a stream tag by its exact key
    pub fn tag(&self, key: &str) -> Option<&Value> {
        self.tags.as_ref().and_then(|tags| tags.get(key))
    }
}

/// Why a probe produced no stream list
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("file does not exist: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("path has no usable parent directory or file name: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("failed to run {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    /// Non-zero exit; `message` is the trimmed stderr, or a generic text when stderr was empty
    #[error("{message}")]
    Exit { code: Option<i32>, message: String },
    #[error("timed out after {0}s")]
    Timeout(u64),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Run ffprobe on a file and return its audio streams in probe order
pub async fn probe_audio_streams(cfg: &FileTestConfig, file_path: &Path) -> Result<Vec<ProbeStream>, ProbeError> {
    if !file_path.exists() {
        return Err(ProbeError::MissingFile(file_path.to_path_buf()));
    }

    let mut cmd = build_command(cfg, file_path)?;
    cmd.kill_on_drop(true);

    let bin = if cfg.docker_image.is_some() { &cfg.docker_bin } else { &cfg.ffprobe_bin };
    let output = if cfg.probe_timeout_secs > 0 {
        match tokio::time::timeout(Duration::from_secs(cfg.probe_timeout_secs), cmd.output()).await {
            Ok(result) => result,
            Err(_) => return Err(ProbeError::Timeout(cfg.probe_timeout_secs)),
        }
    } else {
        cmd.output().await
    };
    let output = output.map_err(|source| ProbeError::Spawn {
        bin: bin.display().to_string(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        debug!("ffprobe exited with {:?} for {}: {}", output.status.code(), file_path.display(), stderr);
        let message = if stderr.is_empty() {
            "ffprobe failed".to_string()
        } else {
            stderr.to_string()
        };
        return Err(ProbeError::Exit { code: output.status.code(), message });
    }

    parse_probe_output(&output.stdout)
}

/// Parse ffprobe JSON. Blank output and a missing or null `streams` array both mean no streams.
pub fn parse_probe_output(stdout: &[u8]) -> Result<Vec<ProbeStream>, ProbeError> {
    if stdout.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    let data: ProbeOutput = serde_json::from_slice(stdout)?;
    Ok(data.streams.unwrap_or_default())
}

/// The ffprobe arguments selecting audio index, codec name and language/title tags
fn probe_args() -> [&'static str; 8] {
    [
        "-v", "error",
        "-select_streams", "a",
        "-show_entries", "stream=index,codec_name:stream_tags=language,title",
        "-of", "json",
    ]
}

fn build_command(cfg: &FileTestConfig, file_path: &Path) -> Result<Command, ProbeError> {
    let Some(image) = cfg.docker_image.as_deref() else {
        let mut cmd = Command::new(&cfg.ffprobe_bin);
        cmd.args(probe_args()).arg(file_path);
        debug!("ffprobe command: {} {} {}", cfg.ffprobe_bin.display(), probe_args().join(" "), file_path.display());
        return Ok(cmd);
    };

    // Mount the parent directory read-only and probe the file by basename
    let parent_dir = file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| ProbeError::InvalidPath(file_path.to_path_buf()))?;
    let basename = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ProbeError::InvalidPath(file_path.to_path_buf()))?;
    let container_path = format!("/config/{}", basename);

    let mut cmd = Command::new(&cfg.docker_bin);
    cmd.arg("run")
        .arg("--rm")
        .arg("--entrypoint")
        .arg(&cfg.ffprobe_bin)
        .arg("-v")
        .arg(format!("{}:/config:ro", parent_dir.display()))
        .arg(image)
        .args(probe_args())
        .arg(&container_path);

    debug!("ffprobe command: {} run --rm --entrypoint {} -v {}:/config:ro {} {} {}",
           cfg.docker_bin.display(), cfg.ffprobe_bin.display(), parent_dir.display(),
           image, probe_args().join(" "), container_path);

    Ok(cmd)
}
