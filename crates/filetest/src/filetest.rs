use std::path::{Path, PathBuf};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use crate::config::FileTestConfig;
use crate::evaluator::{evaluate, Decision, Issue, Verdict};
use crate::ffprobe::{probe_audio_streams, ProbeError, ProbeStream};
use crate::stream::normalize_streams;

/// Check the file extension against the configured allow list
pub fn is_supported_media(cfg: &FileTestConfig, path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| cfg.allows_extension(ext))
        .unwrap_or(false)
}

/// Turn a probe result into a decision. Probe failures become a reported skip.
pub fn decide_probe_result(result: Result<Vec<ProbeStream>, ProbeError>) -> Decision {
    match result {
        Ok(streams) => evaluate(&normalize_streams(&streams)),
        Err(e) => Decision::skip_with_issue(Verdict::ProbeFailed, format!("ffprobe error: {}", e)),
    }
}

/// Run the full file test: extension gate, probe, evaluation
pub async fn test_file(cfg: &FileTestConfig, path: &Path) -> Decision {
    if !is_supported_media(cfg, path) {
        debug!("Skipping {}: extension not in allow list", path.display());
        return Decision::skip(Verdict::UnsupportedExtension);
    }

    let result = probe_audio_streams(cfg, path).await;
    if let Err(e) = &result {
        debug!("ffprobe error on '{}': {}", path.display(), e);
    }

    let decision = decide_probe_result(result);
    debug!("{}: {} ({})", path.display(), if decision.eligible { "queue" } else { "skip" }, decision.verdict);
    decision
}

/// The host's per-file task record.
///
/// Only the queue flag and the issues list are typed. Everything else, `path`
/// and `library_id` included, stays in `fields` and is written back as read.
/// Issue entries stay raw JSON so that other plugins' entries survive intact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub add_file_to_pending_tasks: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TaskRecord {
    pub fn new(path: impl Into<String>) -> Self {
        let mut record = TaskRecord::default();
        record.fields.insert("path".to_string(), Value::String(path.into()));
        record
    }

    /// File path to test; missing, null or non-string reads as empty
    pub fn path(&self) -> &str {
        self.fields.get("path").and_then(Value::as_str).unwrap_or("")
    }

    pub fn library_id(&self) -> Option<&Value> {
        self.fields.get("library_id").filter(|id| !id.is_null())
    }

    /// Merge a decision into the record, appending to whatever issues are already there
    pub fn apply(&mut self, decision: &Decision) {
        self.add_file_to_pending_tasks = decision.eligible;
        self.issues.extend(decision.issues.iter().map(issue_entry));
    }
}

fn issue_entry(issue: &Issue) -> Value {
    json!({ "id": issue.id, "message": issue.message })
}

/// Test the file a task record points at and write the outcome back into it
pub async fn run_task(cfg: &FileTestConfig, record: &mut TaskRecord) -> Decision {
    if let Some(library_id) = record.library_id() {
        debug!("Testing {} for library {}", record.path(), library_id);
    }
    let path = PathBuf::from(record.path());
    let decision = test_file(cfg, &path).await;
    record.apply(&decision);
    decision
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
