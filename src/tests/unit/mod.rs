//! Unit Tests
//!
//! - `client_tests`: retry, backoff and schema validation against wiremock
//! - `generator_tests`: live generator over a mocked provider
//! - `orchestrator_tests`: generate workflow with mockall collaborators
//! - `acceptance_tests`: accept workflow with mockall collaborators
//! - `api_tests`: HTTP surface end to end over SQLite

mod acceptance_tests;
mod api_tests;
mod generator_tests;
