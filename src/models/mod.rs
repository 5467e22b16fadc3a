//! Data Models
//!
//! Request, schema and result types for the analysis pipeline.

pub mod analysis;
pub mod schema;
pub mod test_context;

pub use analysis::{AnalysisOutcome, AnalysisResult, ParseFailure};
pub use schema::{AnalysisReport, SchemaValidation, ANALYSIS_RESPONSE_FORMAT, SCHEMA_VERSION};
pub use test_context::{TestContext, REQUIRED_KEYS};
