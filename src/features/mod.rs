//! Feature-construction pipeline
//!
//! Transforms the three raw relational tables (applicant, credit-bureau,
//! prior-application) into one flat feature table per applicant:
//! - [`policy`] - static column policy and sentinels
//! - [`application`] - applicant table transformer
//! - [`bureau`] - credit-bureau aggregator
//! - [`previous`] - prior-application aggregator
//! - [`assemble`] - left-join assembly anchored at the applicant table

pub mod application;
pub mod assemble;
pub mod bureau;
pub mod policy;
pub mod previous;

pub use application::transform_application;
pub use assemble::{build_features, FeatureSet};
pub use bureau::build_bureau_agg;
pub use policy::{safe_ratio, CAT_FEATURES, CATEGORICAL_MISSING, DROP_COLS, ID_COL, TARGET_COL};
pub use previous::build_prev_app_agg;
