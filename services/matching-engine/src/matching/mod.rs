//! Matching logic

pub mod crossing;
