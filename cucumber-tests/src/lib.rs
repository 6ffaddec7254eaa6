//! Shared fixtures for the evt-edge BDD scenarios

pub mod mock_upstream;

pub use mock_upstream::{MockUpstream, RecordedRequest};
