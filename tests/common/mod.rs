//! Shared integration-test helpers.

#![allow(dead_code)]

pub mod fake_upstream;
pub mod harness;
pub mod http_client;
pub mod upstream;
