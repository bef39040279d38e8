//! Blind judging of three anonymized drafts.
//!
//! # Responsibilities
//! - Ask the judging provider for scores and a ranking
//! - Extract the first usable JSON object from free-form output
//! - Bound the scan: parsed objects are skipped whole, and only a fixed
//!   number of object starts are tried
//! - Repair or derive the ranking from the scores
//!
//! # Design Decisions
//! - A response that cannot be parsed is not an error: the result comes
//!   back empty with the raw text kept, and the caller picks a default
//! - Scores are clamped to 0..=100; a missing label scores 0
//! - A ranking that is not a permutation of A, B, C is replaced by one
//!   derived from the scores, ties broken by label order

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::observability::metrics;
use crate::pipeline::prompts;
use crate::pipeline::types::{JudgeResult, Label};
use crate::resilience::{ExecutionError, ResilientExecutor};
use crate::routing::ModelChoice;

/// Scores and ranking extracted from a judge response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub ranking: Vec<Label>,
    pub scores: BTreeMap<Label, u8>,
}

/// Judge over the resilient executor.
#[derive(Debug, Clone)]
pub struct BlindJudge {
    executor: ResilientExecutor,
}

impl BlindJudge {
    pub fn new(executor: ResilientExecutor) -> Self {
        Self { executor }
    }

    /// Score `texts` against `criteria` using the first healthy candidate.
    pub async fn judge(
        &self,
        platform: &str,
        texts: &BTreeMap<Label, String>,
        criteria: &str,
        candidates: &[ModelChoice],
    ) -> Result<JudgeResult, ExecutionError> {
        let prompt = prompts::judge(texts, platform, criteria);
        let response = self.executor.execute(candidates, &prompt).await?;

        let result = match parse_judge_response(&response.content) {
            Some(verdict) => JudgeResult {
                ranking: verdict.ranking,
                scores: verdict.scores,
                model_name: response.model_name,
                provider_name: response.provider_name,
                raw_response: None,
            },
            None => {
                tracing::warn!(
                    provider = %response.provider_name,
                    model = %response.model_name,
                    "Judge response had no usable JSON verdict"
                );
                metrics::record_judge_parse_failure();
                JudgeResult {
                    ranking: Vec::new(),
                    scores: BTreeMap::new(),
                    model_name: response.model_name,
                    provider_name: response.provider_name,
                    raw_response: Some(response.content),
                }
            }
        };

        Ok(result)
    }
}

/// Object starts tried before a reply is declared unparseable.
const MAX_OBJECT_STARTS: usize = 32;

/// Parse the first top-level JSON object in `raw` that carries at least one
/// label score.
pub fn parse_judge_response(raw: &str) -> Option<Verdict> {
    let mut from = 0;

    for _ in 0..MAX_OBJECT_STARTS {
        let start = from + raw[from..].find('{')?;
        let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();

        match stream.next() {
            Some(Ok(Value::Object(object))) => {
                let wrapped = object.values().filter_map(Value::as_object);
                if let Some(verdict) =
                    std::iter::once(&object).chain(wrapped).find_map(verdict_from_object)
                {
                    return Some(verdict);
                }
                // resume after the whole object, nested braces included
                from = start + stream.byte_offset();
            }
            _ => from = start + 1,
        }
    }

    None
}

fn verdict_from_object(object: &Map<String, Value>) -> Option<Verdict> {
    let score_source = match object.get("scores") {
        Some(Value::Object(nested)) => nested,
        _ => object,
    };

    let mut found_any = false;
    let scores: BTreeMap<Label, u8> = Label::ALL
        .into_iter()
        .map(|label| {
            let score = lookup_label(score_source, label).and_then(score_value);
            found_any |= score.is_some();
            (label, score.unwrap_or(0))
        })
        .collect();

    if !found_any {
        return None;
    }

    let ranking = object
        .get("ranking")
        .and_then(ranking_value)
        .unwrap_or_else(|| derive_ranking(&scores));

    Some(Verdict { ranking, scores })
}

fn lookup_label<'a>(object: &'a Map<String, Value>, label: Label) -> Option<&'a Value> {
    object.get(label.as_str()).or_else(|| {
        object
            .iter()
            .find(|(key, _)| Label::parse(key) == Some(label))
            .map(|(_, value)| value)
    })
}

fn score_value(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 100.0) as u8)
}

/// A ranking that names each label exactly once.
fn ranking_value(value: &Value) -> Option<Vec<Label>> {
    let items = value.as_array()?;
    let ranking: Vec<Label> = items
        .iter()
        .map(|item| item.as_str().and_then(Label::parse))
        .collect::<Option<_>>()?;

    let is_permutation =
        ranking.len() == Label::ALL.len() && Label::ALL.iter().all(|l| ranking.contains(l));
    is_permutation.then_some(ranking)
}

/// Labels by score, highest first, ties in label order.
pub fn derive_ranking(scores: &BTreeMap<Label, u8>) -> Vec<Label> {
    let mut labels: Vec<Label> = scores.keys().copied().collect();
    labels.sort_by(|a, b| scores[b].cmp(&scores[a]).then_with(|| a.cmp(b)));
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derives_ranking_when_missing() {
        let verdict = parse_judge_response(r#"{"A": 90, "B": 70, "C": 80}"#).unwrap();
        assert_eq!(verdict.ranking, vec![Label::A, Label::C, Label::B]);
        assert_eq!(verdict.scores[&Label::B], 70);
    }

    #[test]
    fn test_tolerates_surrounding_prose() {
        let raw = "Here is my verdict:\n```json\n{\"A\": 55, \"B\": 91, \"C\": 60, \"ranking\": [\"B\", \"C\", \"A\"]}\n```\nHope it helps {not json}";
        let verdict = parse_judge_response(raw).unwrap();
        assert_eq!(verdict.ranking, vec![Label::B, Label::C, Label::A]);
    }

    #[test]
    fn test_skips_objects_without_scores() {
        let raw = r#"{"note": "thinking"} then {"scores": {"a": 10, "b": 20, "c": 30}}"#;
        let verdict = parse_judge_response(raw).unwrap();
        assert_eq!(verdict.ranking, vec![Label::C, Label::B, Label::A]);
    }

    #[test]
    fn test_invalid_ranking_is_rederived() {
        let raw = r#"{"A": 10, "B": 40, "C": 40, "ranking": ["B", "B", "D"]}"#;
        let verdict = parse_judge_response(raw).unwrap();
        assert_eq!(verdict.ranking, vec![Label::B, Label::C, Label::A]);
    }

    #[test]
    fn test_scores_clamped_and_defaulted() {
        let raw = r#"{"A": 140, "B": "72.6", "C": -3}"#;
        let verdict = parse_judge_response(raw).unwrap();
        assert_eq!(verdict.scores[&Label::A], 100);
        assert_eq!(verdict.scores[&Label::B], 73);
        assert_eq!(verdict.scores[&Label::C], 0);

        let verdict = parse_judge_response(r#"{"A": 50}"#).unwrap();
        assert_eq!(verdict.scores[&Label::C], 0);
    }

    #[test]
    fn test_finds_verdict_after_brace_heavy_prose() {
        let raw = format!(
            "{} {} {{\"verdict\": {{\"A\": 20, \"B\": 95, \"C\": 60}}}}",
            r#"{"reasoning": {"step": {"detail": "{not json}"}}}"#,
            r#"{"note": "B reads best"}"#,
        );
        let verdict = parse_judge_response(&raw).unwrap();
        assert_eq!(verdict.ranking, vec![Label::B, Label::C, Label::A]);
        assert_eq!(verdict.scores[&Label::B], 95);
    }

    #[test]
    fn test_scan_is_bounded() {
        let noise = "{".repeat(200_000);
        assert!(parse_judge_response(&noise).is_none());

        let unterminated = format!("{}{}", r#"{"a": "x"#.repeat(10_000), r#"{"A": 1}"#);
        assert!(parse_judge_response(&unterminated).is_none());
    }

    #[test]
    fn test_unparseable_response() {
        assert!(parse_judge_response("I liked B the most.").is_none());
        assert!(parse_judge_response("{broken").is_none());
    }
}
