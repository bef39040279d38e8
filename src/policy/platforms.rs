//! Platform policy table.

use std::collections::BTreeMap;

use crate::config::{OrchestratorConfig, PlatformPolicy};
use crate::policy::{normalize_platform, PlatformPolicyProvider};

fn policy(
    char_limit: usize,
    target_chars: Option<usize>,
    primary: &str,
    fallback: &str,
    tone: &str,
    features: &str,
    format: &str,
) -> PlatformPolicy {
    PlatformPolicy {
        char_limit,
        target_chars,
        default_model: primary.to_string(),
        fallback_model: Some(fallback.to_string()),
        tone: Some(tone.to_string()),
        features: Some(features.to_string()),
        format: Some(format.to_string()),
    }
}

/// Built-in policies for the supported platforms.
pub fn builtin_policies() -> BTreeMap<String, PlatformPolicy> {
    let twitter = policy(
        280,
        None,
        "xai",
        "openai",
        "concise and engaging",
        "Use 1-2 relevant hashtags, make every word count",
        "Hook in first line, deliver value quickly",
    );
    let tiktok = policy(
        2200,
        None,
        "xai",
        "openai",
        "energetic and trendy",
        "Short, punchy, emoji-heavy, trending hashtags, call-to-action",
        "Immediate hook, quick value, strong CTA",
    );

    BTreeMap::from([
        (
            "linkedin".to_string(),
            policy(
                3000,
                Some(700),
                "openai",
                "gemini",
                "direct, human, reflective",
                "Short paragraphs (1-2 lines), no links, no emojis as bullet points, \
                 2-3 broad hashtags at the very end",
                "Punchy hook under 140 chars, honest experience, \
                 end with exactly one open question",
            ),
        ),
        ("twitter".to_string(), twitter.clone()),
        ("x".to_string(), twitter),
        (
            "reddit".to_string(),
            policy(
                3000,
                None,
                "anthropic",
                "gemini",
                "conversational and authentic",
                "Be genuine, avoid corporate speak, provide real value to the community",
                "Engaging title mindset, detailed explanation, encourage discussion",
            ),
        ),
        (
            "instagram".to_string(),
            policy(
                2200,
                None,
                "gemini",
                "openai",
                "visual and inspiring",
                "Use emojis strategically, include 10-15 relevant hashtags at the end",
                "Attention-grabbing opening, storytelling, call-to-action, hashtags at the end",
            ),
        ),
        (
            "facebook".to_string(),
            policy(
                3000,
                None,
                "openai",
                "gemini",
                "casual-professional and relatable",
                "Conversational yet polished, questions to encourage engagement",
                "Personal hook, value delivery, call-to-action or question",
            ),
        ),
        ("tiktok".to_string(), tiktok),
    ])
}

/// Built-in table overlaid with configured policies.
#[derive(Debug, Clone)]
pub struct ConfigPolicies {
    policies: BTreeMap<String, PlatformPolicy>,
    default_policy: PlatformPolicy,
}

impl ConfigPolicies {
    pub fn new(
        overrides: BTreeMap<String, PlatformPolicy>,
        default_policy: PlatformPolicy,
    ) -> Self {
        let mut policies = builtin_policies();
        for (platform, policy) in overrides {
            policies.insert(normalize_platform(&platform), policy);
        }
        Self {
            policies,
            default_policy,
        }
    }

    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self::new(config.platforms.clone(), config.default_policy.clone())
    }
}

impl Default for ConfigPolicies {
    fn default() -> Self {
        Self::new(BTreeMap::new(), PlatformPolicy::default())
    }
}

impl PlatformPolicyProvider for ConfigPolicies {
    fn get_policy(&self, platform: &str) -> PlatformPolicy {
        self.policies
            .get(&normalize_platform(platform))
            .cloned()
            .unwrap_or_else(|| self.default_policy.clone())
    }

    fn platforms(&self) -> Vec<String> {
        self.policies.keys().cloned().collect()
    }
}
