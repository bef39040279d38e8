//! Style instruction rendering.

use crate::config::PlatformPolicy;
use crate::policy::{Overrides, StyleInstructionProvider};

/// Renders policy text, limits and caller weights into prompt sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyStyleInstructions;

/// Intensity word for a trait weight; `None` drops the trait.
pub fn weight_to_word(weight: f64) -> Option<&'static str> {
    match weight {
        w if w <= 0.0 || w.is_nan() => None,
        w if w <= 0.2 => Some("hints of"),
        w if w <= 0.4 => Some("subtly"),
        w if w <= 0.6 => Some("noticeably"),
        w if w <= 0.8 => Some("strongly"),
        _ => Some("dominantly"),
    }
}

fn section(title: &str, parts: &[String]) -> Option<String> {
    (!parts.is_empty()).then(|| format!("{title}: {}.", parts.join(". ")))
}

impl StyleInstructionProvider for PolicyStyleInstructions {
    fn build_instructions(
        &self,
        _platform: &str,
        policy: &PlatformPolicy,
        overrides: &Overrides,
    ) -> String {
        let policy = overrides.apply_to(policy);
        let mut sections = Vec::new();

        let mut constraints = vec![format!("Maximum {} characters", policy.char_limit)];
        if let Some(target) = policy.target_chars {
            constraints.push(format!("Target around {target} characters"));
        }
        sections.extend(section("CONSTRAINTS", &constraints));

        let mut voice = Vec::new();
        if let Some(tone) = &policy.tone {
            voice.push(format!("Tone: {tone}"));
        }
        let weighted: Vec<String> = overrides
            .style_weights
            .iter()
            .filter_map(|(name, weight)| {
                weight_to_word(*weight).map(|word| format!("{word} {}", name.replace('_', " ")))
            })
            .collect();
        if !weighted.is_empty() {
            voice.push(format!("Style: {}", weighted.join(", ")));
        }
        sections.extend(section("WRITING STYLE", &voice));

        if let Some(features) = &policy.features {
            sections.extend(section("FEATURES", &[features.clone()]));
        }
        if let Some(format) = &policy.format {
            sections.extend(section("FORMAT", &[format.clone()]));
        }
        if let Some(notes) = overrides.style_notes.as_deref().map(str::trim) {
            if !notes.is_empty() {
                sections.push(format!("NOTES: {notes}"));
            }
        }

        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_weight_words() {
        assert_eq!(weight_to_word(0.0), None);
        assert_eq!(weight_to_word(0.1), Some("hints of"));
        assert_eq!(weight_to_word(0.5), Some("noticeably"));
        assert_eq!(weight_to_word(1.0), Some("dominantly"));
    }

    #[test]
    fn test_renders_policy_and_overrides() {
        let policy = PlatformPolicy {
            char_limit: 3000,
            target_chars: Some(700),
            tone: Some("direct".into()),
            features: None,
            format: Some("Hook, body".into()),
            ..PlatformPolicy::default()
        };
        let overrides = Overrides {
            char_limit: Some(1000),
            style_notes: Some("mention Rust".into()),
            style_weights: BTreeMap::from([
                ("dry_humor".to_string(), 0.3),
                ("formal".to_string(), 0.0),
            ]),
            ..Overrides::default()
        };

        let text = PolicyStyleInstructions.build_instructions("linkedin", &policy, &overrides);

        assert!(text.contains("CONSTRAINTS: Maximum 1000 characters. Target around 700 characters."));
        assert!(text.contains("WRITING STYLE: Tone: direct. Style: subtly dry humor."));
        assert!(!text.contains("formal"));
        assert!(!text.contains("FEATURES"));
        assert!(text.contains("FORMAT: Hook, body."));
        assert!(text.ends_with("NOTES: mention Rust"));
    }

    #[test]
    fn test_deterministic() {
        let policy = PlatformPolicy::default();
        let a = PolicyStyleInstructions.build_instructions("x", &policy, &Overrides::default());
        let b = PolicyStyleInstructions.build_instructions("x", &policy, &Overrides::default());
        assert_eq!(a, b);
    }
}
