//! Upstream payload decoding keyed by content-type.
//!
//! # Decode table
//! | media type                 | strategy |
//! |----------------------------|----------|
//! | `application/json`         | JSON     |
//! | `text/json`                | JSON     |
//! | `application/*+json`       | JSON     |
//! | anything else, or missing  | text     |
//!
//! Parameters (`; charset=utf-8`) are ignored and matching is
//! case-insensitive.

use serde_json::Value;

use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy)]
enum MediaMatch {
    Exact(&'static str),
    /// `type/*+suffix`, stored as (type, suffix).
    Suffix(&'static str, &'static str),
}

impl MediaMatch {
    fn matches(&self, media_type: &str) -> bool {
        match *self {
            MediaMatch::Exact(expected) => media_type == expected,
            MediaMatch::Suffix(top, suffix) => media_type
                .split_once('/')
                .map(|(t, sub)| t == top && sub.ends_with(suffix))
                .unwrap_or(false),
        }
    }
}

const DECODE_TABLE: &[(MediaMatch, DecodeStrategy)] = &[
    (MediaMatch::Exact("application/json"), DecodeStrategy::Json),
    (MediaMatch::Exact("text/json"), DecodeStrategy::Json),
    (MediaMatch::Suffix("application", "+json"), DecodeStrategy::Json),
];

impl DecodeStrategy {
    pub fn for_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return DecodeStrategy::Text;
        };

        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        DECODE_TABLE
            .iter()
            .find(|(matcher, _)| matcher.matches(&media_type))
            .map(|(_, strategy)| *strategy)
            .unwrap_or(DecodeStrategy::Text)
    }

    /// Decode an upstream payload into the value returned to the caller.
    pub fn decode(self, bytes: &[u8]) -> Result<Value, RelayError> {
        match self {
            DecodeStrategy::Json if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Value::Null),
            DecodeStrategy::Json => serde_json::from_slice(bytes)
                .map_err(|e| RelayError::MalformedResponse(e.to_string())),
            DecodeStrategy::Text => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
        }
    }
}
