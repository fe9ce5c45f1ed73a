//! Model layer: dataset preparation, the boosted-tree classifier, the
//! stratified train/validation split, and evaluation metrics.

pub mod dataset;
pub mod gbdt;
pub mod metrics;
pub mod split;

pub use dataset::Dataset;
pub use gbdt::{EvalMetric, GbdtClassifier, GbdtConfig};
pub use metrics::{log_loss, roc_auc};
pub use split::stratified_split;
