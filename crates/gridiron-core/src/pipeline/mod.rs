// Validation-and-ranking pipeline: validator, defense ranking, opponent
// adjustment, analytics and the orchestrator that composes them.

pub mod adjustment;
pub mod analytics;
pub mod ranking;
pub mod transform;
pub mod validator;

pub use adjustment::{AdjustmentBasis, DefenseAdjustedPlayer, DefenseAdjuster};
pub use analytics::{Analytics, SummaryStats};
pub use ranking::{DefenseRanker, DefenseRankings, DefenseStrengthScore, DefenseTier};
pub use transform::{TransformError, TransformOutcome, TransformedResult, Transformer};
pub use validator::{ValidationFailure, ValidationReport, Validator};
