//! Prompt templates for the four stages.

use std::collections::BTreeMap;

use crate::pipeline::types::Label;

pub fn generation(idea: &str, platform: &str, style: &str) -> String {
    format!(
        "You are a content creator for {platform}.

INPUT:
{idea}

STYLE REQUIREMENTS:
{style}

Write ONLY the post content. No meta-commentary, no explanations, no \"Here's the post\" preamble.
Just the actual post text, ready to publish.

Generate the post now:"
    )
}

pub fn critique(v1: &str, platform: &str, style: &str) -> String {
    format!(
        "You are a Critical Reviewer for {platform}.

CURRENT DRAFT:
{v1}

EVALUATION CRITERIA:
{style}

Evaluate the draft against these criteria. If there are weaknesses, rewrite to fix them. If the draft is already strong, return it unchanged.

Output ONLY the final post. No commentary."
    )
}

pub fn improve(v1: &str, v2: &str, platform: &str, style: &str) -> String {
    format!(
        "You are a Content Synthesizer for {platform}.

DRAFT A:
{v1}

DRAFT B:
{v2}

STYLE REQUIREMENTS:
{style}

You have two versions of the same content. Create the best possible final version by:
- Taking what works from each
- Removing what doesn't
- Matching the criteria exactly

If one version is clearly better, use it. Don't blend for the sake of blending.

Output ONLY the final post. No commentary."
    )
}

pub fn judge(texts: &BTreeMap<Label, String>, platform: &str, criteria: &str) -> String {
    let text = |label: Label| texts.get(&label).map(String::as_str).unwrap_or_default();
    format!(
        "You are a Blind Judge for {platform} content.

TEXT A:
{a}

TEXT B:
{b}

TEXT C:
{c}

CRITERIA:
{criteria}

Score each text (0-100) based on how well it matches the criteria.

Output ONLY valid JSON with keys: A, B, C (scores 0-100), and \"ranking\" (array, best to worst).",
        a = text(Label::A),
        b = text(Label::B),
        c = text(Label::C),
    )
}
