use crate::stream::{CodecFamily, StreamDescriptor};

/// ISO 639-1 and 639-2 (T and B) codes for French
pub const FRENCH_LANGUAGE_CODES: &[&str] = &["fr", "fra", "fre"];

/// Title fragments that mark a French track
pub const FRENCH_TITLE_MARKERS: &[&str] = &["vf", "french"];

/// ISO 639-2 "undetermined"
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Whether a stream is a French/VF track, by ISO code or by title.
///
/// Any title containing "vf" or "french" matches. No word-boundary check:
/// "vfx commentary" counts as French.
pub fn is_french(stream: &StreamDescriptor) -> bool {
    FRENCH_LANGUAGE_CODES.contains(&stream.language.as_str())
        || FRENCH_TITLE_MARKERS.iter().any(|marker| stream.title.contains(marker))
}

/// Language of the first stream with a determinate, non-French language.
///
/// Release metadata rarely marks which track is the original audio, so it is
/// inferred. `None` when every stream is French, undetermined or untagged.
pub fn original_language(streams: &[StreamDescriptor]) -> Option<&str> {
    streams
        .iter()
        .find(|s| !s.language.is_empty() && s.language != UNDETERMINED_LANGUAGE && !is_french(s))
        .map(|s| s.language.as_str())
}

pub fn has_french_track(streams: &[StreamDescriptor]) -> bool {
    streams.iter().any(is_french)
}

/// Which streams count as belonging to a language group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageScope<'a> {
    /// Streams tagged with the original language; `None` matches every stream
    Original(Option<&'a str>),
    /// Streams classified by `is_french`
    French,
}

impl<'a> LanguageScope<'a> {
    /// Original-language scope inferred from the stream set
    pub fn original(streams: &'a [StreamDescriptor]) -> Self {
        LanguageScope::Original(original_language(streams))
    }

    pub fn matches(&self, stream: &StreamDescriptor) -> bool {
        match self {
            LanguageScope::Original(Some(language)) => stream.language == *language,
            LanguageScope::Original(None) => true,
            LanguageScope::French => is_french(stream),
        }
    }

    /// Whether any stream in scope has a codec of the given family
    pub fn has_codec(&self, streams: &[StreamDescriptor], family: CodecFamily) -> bool {
        streams.iter().any(|s| self.matches(s) && s.codec_family() == family)
    }
}
