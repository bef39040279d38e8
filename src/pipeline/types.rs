//! Pipeline data types and errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::ProviderResponse;
use crate::resilience::{ErrorKind, ExecutionError};

/// One step of the content pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Generate,
    Critique,
    Improve,
    Judge,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Generate => "generate",
            Stage::Critique => "critique",
            Stage::Improve => "improve",
            Stage::Judge => "judge",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which drafting stage produced a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    V1,
    V2,
    V3,
}

impl Version {
    pub const ALL: [Version; 3] = [Version::V1, Version::V2, Version::V3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V1 => "v1",
            Version::V2 => "v2",
            Version::V3 => "v3",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anonymous label shown to the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Label {
    A,
    B,
    C,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::A, Label::B, Label::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::A => "A",
            Label::B => "B",
            Label::C => "C",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Label::A),
            "B" => Some(Label::B),
            "C" => Some(Label::C),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage output with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draft {
    pub stage: Stage,
    pub content: String,
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency_ms: f64,
}

impl Draft {
    pub fn from_response(stage: Stage, response: ProviderResponse) -> Self {
        Self {
            stage,
            content: response.content,
            provider: response.provider_name,
            model: response.model_name,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            latency_ms: response.latency_ms,
        }
    }
}

/// Bijection from judge labels to drafting versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShuffleMap {
    /// `slots[i]` is the version behind `Label::ALL[i]`.
    slots: [Version; 3],
}

impl ShuffleMap {
    /// Build from a permutation of the three versions.
    ///
    /// Returns `None` unless every version appears exactly once.
    pub fn new(slots: [Version; 3]) -> Option<Self> {
        let covers_all = Version::ALL.iter().all(|v| slots.contains(v));
        covers_all.then_some(Self { slots })
    }

    /// A→v1, B→v2, C→v3.
    pub fn identity() -> Self {
        Self {
            slots: Version::ALL,
        }
    }

    pub fn version_for(&self, label: Label) -> Version {
        self.slots[label as usize]
    }

    pub fn label_for(&self, version: Version) -> Label {
        Label::ALL
            .into_iter()
            .find(|label| self.version_for(*label) == version)
            .unwrap_or(Label::A)
    }

    pub fn entries(&self) -> impl Iterator<Item = (Label, Version)> + '_ {
        Label::ALL.into_iter().map(|label| (label, self.version_for(label)))
    }
}

/// Parsed verdict from the judging provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JudgeResult {
    /// Best to worst. Empty when the response could not be parsed.
    pub ranking: Vec<Label>,
    pub scores: BTreeMap<Label, u8>,
    pub model_name: String,
    pub provider_name: String,
    /// Raw response, kept only when parsing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl JudgeResult {
    /// Winning label: ranking head, else highest score, else none.
    pub fn winner(&self) -> Option<Label> {
        if let Some(first) = self.ranking.first() {
            return Some(*first);
        }
        self.scores
            .iter()
            .max_by(|(la, sa), (lb, sb)| sa.cmp(sb).then_with(|| lb.cmp(la)))
            .map(|(label, _)| *label)
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub platform: String,
    pub v1: Draft,
    pub v2: Draft,
    pub v3: Draft,
    pub shuffle_map: ShuffleMap,
    pub judge: JudgeResult,
    pub winner: Version,
}

impl PipelineResult {
    pub fn draft(&self, version: Version) -> &Draft {
        match version {
            Version::V1 => &self.v1,
            Version::V2 => &self.v2,
            Version::V3 => &self.v3,
        }
    }

    pub fn winning_draft(&self) -> &Draft {
        self.draft(self.winner)
    }

    pub fn final_content(&self) -> &str {
        &self.winning_draft().content
    }

    /// Judge scores keyed by the version they were given to.
    pub fn version_scores(&self) -> BTreeMap<Version, u8> {
        self.judge
            .scores
            .iter()
            .map(|(label, score)| (self.shuffle_map.version_for(*label), *score))
            .collect()
    }
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The generate stage produced invalid content twice.
    #[error("generated content failed validation: {reason}")]
    ValidationFailed { reason: String },

    /// A stage exhausted every provider.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ExecutionError,
    },

    #[error("pipeline cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            PipelineError::Stage { source, .. } => source.kind(),
            PipelineError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

pub type PipelineOutcome = Result<PipelineResult, PipelineError>;
