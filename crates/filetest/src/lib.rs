pub mod config;
pub mod ffprobe;
pub mod stream;
pub mod language;
pub mod evaluator;
pub mod filetest;
pub mod scan;

pub use config::FileTestConfig;
pub use ffprobe::{ProbeError, ProbeStream};
pub use stream::{StreamDescriptor, normalize, normalize_streams};
pub use language::{is_french, original_language, has_french_track};
pub use evaluator::{evaluate, Decision, Issue, Verdict, ISSUE_ID};
pub use filetest::{decide_probe_result, is_supported_media, run_task, test_file, TaskRecord};
