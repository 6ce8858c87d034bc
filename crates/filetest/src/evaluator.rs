use std::fmt;
use serde::{Deserialize, Serialize};
use crate::language::{has_french_track, LanguageScope};
use crate::stream::{CodecFamily, StreamDescriptor};

/// Issue id reported to the host for every diagnostic
pub const ISSUE_ID: &str = "jf_truehd_vf_filetest";

/// A user-visible diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub message: String,
}

impl Issue {
    pub fn new(message: impl Into<String>) -> Self {
        Issue {
            id: ISSUE_ID.to_string(),
            message: message.into(),
        }
    }
}

/// Which rule settled the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Extension not on the allow list; never probed
    UnsupportedExtension,
    /// The probe failed
    ProbeFailed,
    NoAudioStreams,
    /// No TrueHD/MLP stream anywhere in the file
    NoTrueHd,
    /// Every required language already has an AC3/E-AC3 track
    AlreadyCompatible,
    /// A fallback is missing and no TrueHD source exists to build it from
    CannotProduceFallback,
    /// Fallbacks are needed and producible; the flags say for which language groups
    Eligible { original: bool, french: bool },
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::UnsupportedExtension => write!(f, "unsupported extension"),
            Verdict::ProbeFailed => write!(f, "probe failed"),
            Verdict::NoAudioStreams => write!(f, "no audio streams"),
            Verdict::NoTrueHd => write!(f, "no truehd/mlp stream"),
            Verdict::AlreadyCompatible => write!(f, "compatible fallback already present"),
            Verdict::CannotProduceFallback => write!(f, "missing fallback has no truehd source"),
            Verdict::Eligible { original, french } => {
                let targets: Vec<&str> = [(*original, "original"), (*french, "vf")]
                    .into_iter()
                    .filter_map(|(needed, name)| needed.then_some(name))
                    .collect();
                write!(f, "fallback needed for {}", targets.join(" + "))
            }
        }
    }
}

/// Outcome of testing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub eligible: bool,
    pub issues: Vec<Issue>,
    pub verdict: Verdict,
}

impl Decision {
    /// Not eligible, nothing reported
    pub fn skip(verdict: Verdict) -> Self {
        Decision { eligible: false, issues: Vec::new(), verdict }
    }

    /// Not eligible, with one diagnostic for the host
    pub fn skip_with_issue(verdict: Verdict, message: impl Into<String>) -> Self {
        Decision { eligible: false, issues: vec![Issue::new(message)], verdict }
    }

    fn queue(original: bool, french: bool) -> Self {
        Decision {
            eligible: true,
            issues: Vec::new(),
            verdict: Verdict::Eligible { original, french },
        }
    }
}

/// Decide whether a file's audio layout should be queued for fallback generation.
///
/// Rules apply in order and the first one that settles the outcome wins:
/// no streams (reported), no TrueHD/MLP at all, every required language
/// already compatible, then whether each missing fallback has a TrueHD/MLP
/// source in the same language group. Only the empty case produces an issue.
pub fn evaluate(streams: &[StreamDescriptor]) -> Decision {
    if streams.is_empty() {
        return Decision::skip_with_issue(Verdict::NoAudioStreams, "No audio streams");
    }

    if !streams.iter().any(StreamDescriptor::is_truehd) {
        return Decision::skip(Verdict::NoTrueHd);
    }

    let original = LanguageScope::original(streams);
    let french = LanguageScope::French;

    let vf_present = has_french_track(streams);
    let orig_ok = original.has_codec(streams, CodecFamily::Compatible);
    let vf_ok = !vf_present || french.has_codec(streams, CodecFamily::Compatible);

    if orig_ok && vf_ok {
        return Decision::skip(Verdict::AlreadyCompatible);
    }

    let need_orig = !orig_ok;
    let need_vf = vf_present && !vf_ok;

    let can_orig = !need_orig || original.has_codec(streams, CodecFamily::TrueHd);
    let can_vf = !need_vf || french.has_codec(streams, CodecFamily::TrueHd);

    if can_orig && can_vf {
        Decision::queue(need_orig, need_vf)
    } else {
        Decision::skip(Verdict::CannotProduceFallback)
    }
}
