//! Commands
//!
//! Entry points behind the binary's subcommands:
//! - `analyze`: one batch run over files on disk
//! - `serve`: the multipart HTTP endpoint

pub mod analyze;
pub mod serve;

pub use analyze::AnalyzeArgs;
pub use serve::{router, ServeArgs, ServerState};
