//! Slug derivation for new tasks.
//!
//! A slug has the shape `{sequence}-{normalized-title}`. The sequence is one
//! past the identifier of the most recently created task that still exists,
//! so two tasks with the same title always differ in their numeric prefix.

use super::{ParseSlugPolicyError, TaskId, TaskSlug};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '-';

/// How non-ASCII characters in a title are treated during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugPolicy {
    /// Keep Unicode letters and digits, lower-cased.
    #[default]
    Unicode,
    /// Transliterate to ASCII, dropping diacritics.
    Ascii,
}

impl SlugPolicy {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unicode => "unicode",
            Self::Ascii => "ascii",
        }
    }
}

impl FromStr for SlugPolicy {
    type Err = ParseSlugPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unicode" => Ok(Self::Unicode),
            "ascii" => Ok(Self::Ascii),
            _ => Err(ParseSlugPolicyError(value.to_owned())),
        }
    }
}

impl fmt::Display for SlugPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the sequence number for the next slug.
///
/// `latest` is the identifier of the most recently created task still in the
/// store, or `None` for an empty store.
#[must_use]
pub fn next_sequence(latest: Option<TaskId>) -> i64 {
    latest.map_or(1, |id| id.value().saturating_add(1))
}

/// Normalizes a title into the textual part of a slug.
///
/// Letters are lower-cased and every run of characters that are not
/// alphanumeric collapses into a single `-`; separators never lead or trail.
#[must_use]
pub fn normalize_title(title: &str, policy: SlugPolicy) -> String {
    match policy {
        SlugPolicy::Unicode => collapse(title.chars()),
        SlugPolicy::Ascii => collapse(::slug::slugify(title).chars()),
    }
}

/// Builds the slug for a task created with `title` at `sequence`.
#[must_use]
pub fn generate_slug(title: &str, sequence: i64, policy: SlugPolicy) -> TaskSlug {
    let normalized = normalize_title(title, policy);
    TaskSlug::from_generated(format!("{sequence}{SEPARATOR}{normalized}"))
}

fn collapse(chars: impl Iterator<Item = char>) -> String {
    let mut slug = String::new();
    let mut pending_separator = false;
    for ch in chars {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}
