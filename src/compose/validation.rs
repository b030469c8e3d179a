/// Hashtag and comment validation
///
/// Pure functions: safe to run on every keystroke and once more at
/// submit time.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

pub const MAX_HASHTAG_COUNT: usize = 5;
pub const MAX_HASHTAG_LENGTH: usize = 20;
pub const MAX_COMMENT_LENGTH: usize = 140;

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#[a-zа-яё0-9]{1,19}$").expect("valid hashtag regex"));

/// Outcome of validating the hashtag field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HashtagReport {
    pub ok: bool,
    /// Distinct reasons, most important first
    pub reasons: Vec<ValidationError>,
}

impl HashtagReport {
    /// Message to show next to the field
    pub fn first_message(&self) -> Option<String> {
        self.reasons.first().map(ToString::to_string)
    }
}

/// Outcome of validating the comment field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommentReport {
    pub ok: bool,
    pub reason: Option<ValidationError>,
}

impl CommentReport {
    pub fn message(&self) -> Option<String> {
        self.reason.map(|reason| reason.to_string())
    }
}

/// Split the raw field into non-empty whitespace-separated tokens
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Check a single token against the hashtag format rules
fn token_error(token: &str) -> Option<ValidationError> {
    if token == "#" {
        return Some(ValidationError::BareHash);
    }
    if token.chars().count() > MAX_HASHTAG_LENGTH {
        return Some(ValidationError::TooLong);
    }
    if !HASHTAG_RE.is_match(token) {
        return Some(ValidationError::BadFormat);
    }
    None
}

pub fn validate_hashtags(text: &str) -> HashtagReport {
    let tokens = tokenize(text);
    let mut reasons = Vec::new();

    if tokens.len() > MAX_HASHTAG_COUNT {
        reasons.push(ValidationError::TooMany);
    }

    let mut seen = HashSet::new();
    if !tokens.iter().all(|tag| seen.insert(tag.to_lowercase())) {
        reasons.push(ValidationError::Duplicate);
    }

    for reason in tokens.iter().filter_map(|tag| token_error(tag)) {
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }

    HashtagReport {
        ok: reasons.is_empty(),
        reasons,
    }
}

pub fn validate_comment(text: &str) -> CommentReport {
    if text.chars().count() <= MAX_COMMENT_LENGTH {
        CommentReport { ok: true, reason: None }
    } else {
        CommentReport {
            ok: false,
            reason: Some(ValidationError::CommentTooLong),
        }
    }
}
