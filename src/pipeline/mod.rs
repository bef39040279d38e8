//! Content pipeline.
//!
//! # Data Flow
//! ```text
//! run_batch (one task per platform)
//!     → orchestrator.rs (generate → critique → improve → judge)
//!         → routing + resilient executor per stage
//!         → shuffle.rs (anonymize) → judge.rs (verdict) → shuffle.rs (reveal)
//!     → BatchReport (per-platform outcome, request order)
//! ```

pub mod batch;
pub mod judge;
pub mod orchestrator;
pub mod prompts;
pub mod shuffle;
pub mod types;

pub use batch::{run_batch, BatchReport, DraftProvenance, PlatformOutcome};
pub use judge::{derive_ranking, parse_judge_response, BlindJudge, Verdict};
pub use orchestrator::{Orchestrator, ResetTarget};
pub use shuffle::{anonymize, reveal, shuffle};
pub use types::{
    Draft, JudgeResult, Label, PipelineError, PipelineOutcome, PipelineResult, ShuffleMap, Stage,
    Version,
};
