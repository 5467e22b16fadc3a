//! Perf Analyzer Core
//!
//! Foundational error types and shared configuration records for the Perf
//! Analyzer workspace. This crate has zero dependencies on application-level
//! code (HTTP transport, LLM providers, CLI).
//!
//! ## Module Organization
//!
//! - `error` - Input-side error taxonomy (`CoreError`, `CoreResult`, `InputKind`)
//! - `proxy` - Proxy configuration shared by the HTTP client factory

pub mod error;
pub mod proxy;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult, InputKind};

// ── Proxy Types ────────────────────────────────────────────────────────
pub use proxy::{ProxyConfig, ProxyProtocol};
