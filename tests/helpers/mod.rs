//! Test helpers module
//!
//! Database setup, a mock message gateway and builders for test data.

#![allow(dead_code)]

pub mod database_helper;
pub mod gateway_mock;
pub mod test_data;

pub use database_helper::*;
pub use gateway_mock::*;
pub use test_data::*;
