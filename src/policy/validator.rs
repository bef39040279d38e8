//! Draft validation against platform limits.
//!
//! # Responsibilities
//! - Reject empty drafts and drafts that are really provider error text
//! - Enforce the effective character limit and a minimum length
//! - Apply the platform-specific hashtag and emoji rules
//!
//! # Design Decisions
//! - Characters are Unicode scalar values, not bytes
//! - First failing check wins; the reason names it

use serde::Serialize;

use crate::config::PlatformPolicy;
use crate::policy::{normalize_platform, Validator};

const MIN_CHARS: usize = 10;

const ERROR_PHRASES: &[&str] = &[
    "error generating",
    "failed to generate",
    "could not generate",
    "unable to create",
];

const LOUD_EMOJIS: &[&str] = &["😀", "😂", "🔥", "💯", "✨", "🎉", "😍"];

/// Result of validating one draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub reason: Option<String>,
    pub char_count: usize,
}

impl ValidationOutcome {
    fn pass(char_count: usize) -> Self {
        Self {
            passed: true,
            reason: None,
            char_count,
        }
    }

    fn fail(reason: impl Into<String>, char_count: usize) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
            char_count,
        }
    }
}

/// Default validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputValidator;

impl OutputValidator {
    fn platform_rules(content: &str, platform: &str, char_count: usize) -> ValidationOutcome {
        let hashtags = content.matches('#').count();

        match platform {
            "twitter" | "x" if hashtags > 3 => ValidationOutcome::fail(
                "Too many hashtags for Twitter (max 2 recommended)",
                char_count,
            ),
            "instagram" if hashtags < 3 => ValidationOutcome::fail(
                "Instagram posts should include hashtags (10-15 recommended)",
                char_count,
            ),
            "linkedin" => {
                let emojis: usize = LOUD_EMOJIS.iter().map(|e| content.matches(e).count()).sum();
                if emojis > 3 {
                    ValidationOutcome::fail(
                        "Too many emojis for LinkedIn professional tone",
                        char_count,
                    )
                } else {
                    ValidationOutcome::pass(char_count)
                }
            }
            _ => ValidationOutcome::pass(char_count),
        }
    }
}

impl Validator for OutputValidator {
    fn validate(&self, content: &str, platform: &str, policy: &PlatformPolicy) -> ValidationOutcome {
        if content.trim().is_empty() {
            return ValidationOutcome::fail("Content is empty", 0);
        }

        let char_count = content.chars().count();
        let lowered = content.to_lowercase();

        if ERROR_PHRASES.iter().any(|p| lowered.contains(p)) {
            return ValidationOutcome::fail("Content contains error message", char_count);
        }
        if char_count > policy.char_limit {
            return ValidationOutcome::fail(
                format!(
                    "Content exceeds character limit ({char_count}/{})",
                    policy.char_limit
                ),
                char_count,
            );
        }
        if char_count < MIN_CHARS {
            return ValidationOutcome::fail(
                format!("Content too short (less than {MIN_CHARS} characters)"),
                char_count,
            );
        }

        Self::platform_rules(content, &normalize_platform(platform), char_count)
    }
}
