//! Core protocol constants shared across the SDK

pub mod constants;
