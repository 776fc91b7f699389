//! CLI command implementations
//!
//! Each module contains the command definitions and execution logic
//! for one area of the dashboard.

pub mod dao;
pub mod dashboard;
pub mod governance;
pub mod lang;
pub mod proposal;
pub mod wallet;
