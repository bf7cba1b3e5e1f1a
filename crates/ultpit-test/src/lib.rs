//! Shared test fixtures for ultpit crates.
//!
//! This crate provides plain data and pure functions for testing.
//! It does NOT depend on `ultpit-core` so that `ultpit-core` itself can use it
//! as a dev-dependency without two copies of its types meeting in one test.
//!
//! - [`scenario`] - Hand-checked grids with known optimal pits
//! - [`deposit`] - Seeded synthetic block value fields
//! - [`oracle`] - Brute-force maximum closure for tiny problems
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! ultpit-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use ultpit_test::scenario::two_by_two;
//! use ultpit_test::oracle::max_closure_value;
//! ```

pub mod deposit;
pub mod oracle;
pub mod scenario;

pub use scenario::Scenario;
