//! Platform policies and the collaborators the pipeline consumes.
//!
//! # Responsibilities
//! - Resolve a platform name to its limits and default routing
//! - Render style instructions as opaque prompt text
//! - Validate generated drafts against platform limits
//!
//! # Design Decisions
//! - Each collaborator is a trait so callers can substitute their own
//! - Built-in platform table is layered under configured policies
//! - Caller overrides are applied to a policy copy, never stored

pub mod overrides;
pub mod platforms;
pub mod style;
pub mod validator;

pub use overrides::Overrides;
pub use platforms::{builtin_policies, ConfigPolicies};
pub use style::PolicyStyleInstructions;
pub use validator::{OutputValidator, ValidationOutcome};

use crate::config::PlatformPolicy;

/// Source of platform limits and default routing.
pub trait PlatformPolicyProvider: Send + Sync {
    fn get_policy(&self, platform: &str) -> PlatformPolicy;

    /// Platforms with an explicit policy, sorted.
    fn platforms(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Renders style configuration into prompt text.
pub trait StyleInstructionProvider: Send + Sync {
    fn build_instructions(
        &self,
        platform: &str,
        policy: &PlatformPolicy,
        overrides: &Overrides,
    ) -> String;
}

/// Content gate applied after the generate stage.
pub trait Validator: Send + Sync {
    fn validate(&self, content: &str, platform: &str, policy: &PlatformPolicy)
        -> ValidationOutcome;
}

/// Normalize a platform name for lookups.
pub fn normalize_platform(platform: &str) -> String {
    platform.trim().to_lowercase()
}
