//! Integration Tests Module
//!
//! End-to-end tests for the analysis pipeline and the HTTP endpoint. The
//! model is replaced by a recording mock, so no network calls are made.

// Shared fixtures and the mock provider
mod support;

// ReportParser end-to-end scenarios
mod pipeline_test;

// POST /analyse and GET /health
mod server_test;
