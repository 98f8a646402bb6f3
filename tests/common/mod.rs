//! Common test utilities for paper-export integration tests

#[allow(dead_code)]
pub mod dropbox;

pub use dropbox::*;
