//! Credit scorer - loan default probability from applicant and history data
//!
//! The crate turns three raw CSV tables (the applicant table plus bureau and
//! previous-application history) into a flat per-applicant feature table,
//! trains a gradient-boosted classifier on it, and scores new applications
//! into a two-column submission file.
//!
//! # Modules
//!
//! - [`data`] - Raw table loading and prediction output
//! - [`features`] - Column policy, applicant transform, history aggregators,
//!   and the final feature assembly
//! - [`model`] - Dataset preparation, the boosted-tree classifier, the
//!   stratified split, and evaluation metrics
//! - [`pipeline`] - End-to-end train and predict orchestration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod cli;
pub mod data;
pub mod features;
pub mod model;
pub mod pipeline;

pub use error::{Result, ScorerError};
