use serde_json::Value;
use crate::ffprobe::ProbeStream;

/// Lossless codecs that some playback clients cannot decode
pub const TRUEHD_CODECS: &[&str] = &["truehd", "mlp"];

/// Lossy codecs that are safe to fall back on
pub const COMPATIBLE_CODECS: &[&str] = &["ac3", "eac3"];

/// Codec grouping used by the eligibility rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecFamily {
    TrueHd,
    Compatible,
    Other,
}

/// One audio stream with codec, language and title normalized.
///
/// All fields are trimmed and lower-cased. Missing metadata is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub codec: String,
    pub language: String,
    pub title: String,
}

impl StreamDescriptor {
    /// Build a descriptor from raw text, normalizing every field
    pub fn new(codec: &str, language: &str, title: &str) -> Self {
        Self {
            codec: normalize_text(codec),
            language: normalize_text(language),
            title: normalize_text(title),
        }
    }

    pub fn codec_family(&self) -> CodecFamily {
        let codec = self.codec.as_str();
        if TRUEHD_CODECS.contains(&codec) {
            CodecFamily::TrueHd
        } else if COMPATIBLE_CODECS.contains(&codec) {
            CodecFamily::Compatible
        } else {
            CodecFamily::Other
        }
    }

    pub fn is_truehd(&self) -> bool {
        self.codec_family() == CodecFamily::TrueHd
    }
}

/// Convert one probed stream into a descriptor. Never fails.
pub fn normalize(stream: &ProbeStream) -> StreamDescriptor {
    StreamDescriptor {
        codec: normalize_value(stream.codec_name.as_ref()),
        language: normalize_value(stream.tag("language")),
        title: normalize_value(stream.tag("title")),
    }
}

/// Normalize a whole probe result, keeping probe order
pub fn normalize_streams(streams: &[ProbeStream]) -> Vec<StreamDescriptor> {
    streams.iter().map(normalize).collect()
}

fn normalize_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => normalize_text(s),
        _ => String::new(),
    }
}

fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn probe_stream(codec: Option<Value>, tags: Option<Vec<(&str, Value)>>) -> ProbeStream {
        ProbeStream {
            index: Some(1),
            codec_name: codec,
            tags: tags.map(|t| t.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<HashMap<_, _>>()),
        }
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let stream = probe_stream(
            Some(Value::from("  TrueHD ")),
            Some(vec![("language", Value::from(" ENG")), ("title", Value::from("Atmos 7.1\t"))]),
        );
        assert_eq!(normalize(&stream), StreamDescriptor {
            codec: "truehd".into(),
            language: "eng".into(),
            title: "atmos 7.1".into(),
        });
    }

    #[test]
    fn test_missing_metadata_becomes_empty() {
        assert_eq!(normalize(&probe_stream(None, None)), StreamDescriptor::default());

        let only_codec = normalize(&probe_stream(Some(Value::from("ac3")), Some(vec![])));
        assert_eq!(only_codec.codec, "ac3");
        assert!(only_codec.language.is_empty());
        assert!(only_codec.title.is_empty());
    }

    #[test]
    fn test_non_string_metadata_becomes_empty() {
        let stream = probe_stream(
            Some(Value::from(42)),
            Some(vec![("language", Value::Null), ("title", Value::Bool(true))]),
        );
        assert_eq!(normalize(&stream), StreamDescriptor::default());
    }

    #[test]
    fn test_tag_keys_are_exact() {
        let stream = probe_stream(Some(Value::from("eac3")), Some(vec![("LANGUAGE", Value::from("fre"))]));
        assert!(normalize(&stream).language.is_empty());
    }

    #[test]
    fn test_codec_families() {
        assert_eq!(StreamDescriptor::new("TrueHD", "", "").codec_family(), CodecFamily::TrueHd);
        assert_eq!(StreamDescriptor::new("mlp", "", "").codec_family(), CodecFamily::TrueHd);
        assert_eq!(StreamDescriptor::new("AC3", "", "").codec_family(), CodecFamily::Compatible);
        assert_eq!(StreamDescriptor::new("eac3", "", "").codec_family(), CodecFamily::Compatible);
        for other in ["dts", "aac", "flac", "opus", "", "truehd_atmos"] {
            assert_eq!(StreamDescriptor::new(other, "", "").codec_family(), CodecFamily::Other, "{}", other);
        }
    }

    #[test]
    fn test_normalize_streams_keeps_order() {
        let streams = vec![
            probe_stream(Some(Value::from("truehd")), None),
            probe_stream(Some(Value::from("ac3")), None),
            probe_stream(Some(Value::from("dts")), None),
        ];
        let codecs: Vec<String> = normalize_streams(&streams).into_iter().map(|d| d.codec).collect();
        assert_eq!(codecs, vec!["truehd", "ac3", "dts"]);
    }
}
