//! # Entity References and Prose Style
//!
//! Entity references (`&AWS;`, `&S3long;`) are placeholders the renderer
//! replaces with branded product names. A field that holds *only* an entity
//! must match [`ENTITY_PATTERN`]; prose may embed any number of them, but
//! every `&` in prose must open a well-formed reference.
//!
//! The style predicates implement the authoring rules enforced in strict
//! mode: titles start with a capital and carry no terminal punctuation,
//! sentences end with punctuation, and the bare word `AWS` is always
//! written as the `&AWS;` entity.

use std::sync::OnceLock;

use regex::Regex;

/// A field consisting of exactly one entity reference.
pub const ENTITY_PATTERN: &str = r"^&[0-9A-Za-z_-]+;$";

/// An entity reference embedded in prose.
const EMBEDDED_ENTITY: &str = r"&[0-9A-Za-z_-]+;";

/// Characters accepted as the end of a sentence.
pub const TERMINAL_PUNCTUATION: [char; 4] = ['.', '!', '?', ':'];

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENTITY_PATTERN).expect("entity pattern is valid"))
}

fn embedded_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMBEDDED_ENTITY).expect("embedded entity pattern is valid"))
}

fn bare_aws_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bAWS\b").expect("AWS pattern is valid"))
}

/// Returns true if `value` is exactly one entity reference.
pub fn is_entity(value: &str) -> bool {
    entity_regex().is_match(value)
}

/// Entity references embedded in `text`, in order of appearance.
pub fn entities_in(text: &str) -> Vec<&str> {
    embedded_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Fragments of `text` that start with `&` but are not well-formed entity
/// references, e.g. `&S3` missing its semicolon.
pub fn malformed_entities(text: &str) -> Vec<String> {
    let stripped = embedded_regex().replace_all(text, " ");
    stripped
        .match_indices('&')
        .map(|(start, _)| {
            stripped[start..]
                .split_whitespace()
                .next()
                .unwrap_or("&")
                .to_string()
        })
        .collect()
}

/// Returns true if `text` mentions `AWS` outside an entity reference.
pub fn has_bare_aws(text: &str) -> bool {
    let stripped = embedded_regex().replace_all(text, " ");
    bare_aws_regex().is_match(&stripped)
}

/// A prose style rule that a piece of text broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleIssue {
    /// Must start with an uppercase letter, digit, or entity.
    LowercaseStart,
    /// Must start with a lowercase letter, digit, or entity.
    UppercaseStart,
    /// Must end with terminal punctuation.
    MissingEndPunctuation,
    /// Must not end with terminal punctuation.
    TrailingPunctuation,
    /// `AWS` written without the `&AWS;` entity.
    BareAws,
}

impl StyleIssue {
    /// Human-readable statement of the rule.
    pub fn describe(self) -> &'static str {
        match self {
            Self::LowercaseStart => "must start with an uppercase letter or an entity",
            Self::UppercaseStart => "must start with a lowercase letter or an entity",
            Self::MissingEndPunctuation => "must end with punctuation",
            Self::TrailingPunctuation => "must not end with punctuation",
            Self::BareAws => "must write AWS as the &AWS; entity",
        }
    }
}

/// Style rules for headings: capitalized, no terminal punctuation.
pub fn check_title(text: &str) -> Vec<StyleIssue> {
    let mut issues = Vec::new();
    if !starts_upper(text) {
        issues.push(StyleIssue::LowercaseStart);
    }
    if text.trim_end().ends_with(TERMINAL_PUNCTUATION) {
        issues.push(StyleIssue::TrailingPunctuation);
    }
    if has_bare_aws(text) {
        issues.push(StyleIssue::BareAws);
    }
    issues
}

/// Style rules for stand-alone sentences: capitalized and punctuated.
pub fn check_sentence(text: &str) -> Vec<StyleIssue> {
    let mut issues = Vec::new();
    if !starts_upper(text) {
        issues.push(StyleIssue::LowercaseStart);
    }
    if !text.trim_end().ends_with(TERMINAL_PUNCTUATION) {
        issues.push(StyleIssue::MissingEndPunctuation);
    }
    if has_bare_aws(text) {
        issues.push(StyleIssue::BareAws);
    }
    issues
}

/// Style rules for a synopsis, which completes the rendered phrase
/// "shows how to ...": lowercase start, punctuated.
pub fn check_synopsis(text: &str) -> Vec<StyleIssue> {
    let mut issues = Vec::new();
    if !starts_lower(text) {
        issues.push(StyleIssue::UppercaseStart);
    }
    if !text.trim_end().ends_with(TERMINAL_PUNCTUATION) {
        issues.push(StyleIssue::MissingEndPunctuation);
    }
    if has_bare_aws(text) {
        issues.push(StyleIssue::BareAws);
    }
    issues
}

fn starts_upper(text: &str) -> bool {
    match text.trim_start().chars().next() {
        Some(c) => c == '&' || c.is_ascii_digit() || c.is_uppercase(),
        None => false,
    }
}

fn starts_lower(text: &str) -> bool {
    match text.trim_start().chars().next() {
        Some(c) => c == '&' || c.is_ascii_digit() || c.is_lowercase(),
        None => false,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any well-formed name wrapped in `&...;` is an entity.
        #[test]
        fn wrapped_names_are_entities(name in "[0-9A-Za-z_-]{1,24}") {
            let wrapped = format!("&{name};");
            prop_assert!(is_entity(&wrapped));
        }

        /// A bare name is never an entity.
        #[test]
        fn bare_names_are_not_entities(name in "[0-9A-Za-z_-]{0,24}") {
            prop_assert!(!is_entity(&name));
        }

        /// Prose built only from entities and plain words has nothing malformed.
        #[test]
        fn well_formed_prose_has_no_malformed_entities(
            words in prop::collection::vec("[a-z]{1,8}|&[A-Za-z0-9]{1,8};", 0..12)
        ) {
            let text = words.join(" ");
            prop_assert!(malformed_entities(&text).is_empty());
        }
    }
}
