//! Shared helpers for the tycoon backend test suites: one logging bootstrap,
//! unique identity generators, and problem-details assertions.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
