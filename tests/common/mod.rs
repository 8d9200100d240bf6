//! Common test utilities

#![allow(dead_code)]

pub mod ezlo_mock;

pub use ezlo_mock::*;
