//! Integration tests for Linkwatch
//!
//! These tests use wiremock to stand in for both the monitored sites and the
//! Mailgun API, and drive the public API end-to-end over a SQLite file.

mod common;
mod monitor_tests;
mod probe_tests;
