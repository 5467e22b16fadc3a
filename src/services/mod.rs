//! Services
//!
//! Business logic called by the CLI and HTTP commands.

pub mod report;

pub use report::{AnalysisOptions, AnalysisRequest, ReportParser};
