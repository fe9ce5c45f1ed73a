//! Gradient-boosted symmetric trees for default probability
//!
//! Binary classifier in the CatBoost mold: symmetric (oblivious) trees where
//! every node at a depth shares the same split, Logloss gradients, and
//! categorical features handled natively via smoothed target statistics
//! learned at fit time. Training selects the model at the best validation
//! score, with early stopping after a configurable number of rounds without
//! improvement.

use ndarray::{Array1, Array2, ArrayView1};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::dataset::Dataset;
use super::metrics::{log_loss, roc_auc};
use crate::error::{Result, ScorerError};
use crate::features::policy::CATEGORICAL_MISSING;

/// Validation metric used for model selection and early stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalMetric {
    Auc,
    Logloss,
}

impl EvalMetric {
    fn higher_is_better(self) -> bool {
        matches!(self, EvalMetric::Auc)
    }

    fn compute(self, y_true: &Array1<f64>, y_prob: &Array1<f64>) -> f64 {
        match self {
            EvalMetric::Auc => roc_auc(y_true, y_prob),
            EvalMetric::Logloss => log_loss(y_true, y_prob),
        }
    }
}

/// Training configuration. Defaults mirror the production training call:
/// 1000 iterations, learning rate 0.05, depth 6, AUC selection with 200
/// rounds of patience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtConfig {
    pub iterations: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub reg_lambda: f64,
    pub eval_metric: EvalMetric,
    pub early_stopping_rounds: Option<usize>,
    /// Log validation score every this many iterations.
    pub log_period: usize,
    pub random_seed: u64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            learning_rate: 0.05,
            max_depth: 6,
            reg_lambda: 3.0,
            eval_metric: EvalMetric::Auc,
            early_stopping_rounds: Some(200),
            log_period: 200,
            random_seed: 42,
        }
    }
}

/// Symmetric (oblivious) tree: each level uses the same split feature and
/// threshold. A NaN feature value fails the `>` comparison and always takes
/// the low branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SymmetricTree {
    splits: Vec<(usize, f64)>, // (feature, threshold) per level
    leaf_values: Vec<f64>,     // 2^depth leaf values
}

impl SymmetricTree {
    fn predict(&self, sample: ArrayView1<f64>) -> f64 {
        let mut idx = 0usize;
        for &(feature, threshold) in &self.splits {
            idx = idx * 2 + usize::from(sample[feature] > threshold);
        }
        self.leaf_values[idx.min(self.leaf_values.len() - 1)]
    }
}

fn build_symmetric_tree(
    x: &Array2<f64>,
    gradients: &[f64],
    hessians: &[f64],
    max_depth: usize,
    reg_lambda: f64,
) -> SymmetricTree {
    let n_samples = x.nrows();
    let n_features = x.ncols();
    let mut splits = Vec::with_capacity(max_depth);

    // Current partition of row indices into buckets
    let mut buckets: Vec<Vec<usize>> = vec![(0..n_samples).collect()];

    for _depth in 0..max_depth {
        // Best global split across all buckets (symmetric = same split for all)
        let best = (0..n_features)
            .into_par_iter()
            .filter_map(|feat| {
                let mut all_vals: Vec<f64> = buckets
                    .iter()
                    .flat_map(|b| b.iter().map(|&i| x[[i, feat]]))
                    .filter(|v| v.is_finite())
                    .collect();
                all_vals
                    .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                all_vals.dedup();

                if all_vals.len() < 2 {
                    return None;
                }

                let mut best_gain = f64::NEG_INFINITY;
                let mut best_thr = 0.0;

                // Sample up to 256 candidate thresholds for efficiency
                let step = (all_vals.len() / 256).max(1);
                for i in (0..all_vals.len() - 1).step_by(step) {
                    let thr = (all_vals[i] + all_vals[i + 1]) / 2.0;
                    let mut total_gain = 0.0;

                    for bucket in &buckets {
                        let (lg, lh, rg, rh) = bucket.iter().fold(
                            (0.0, 0.0, 0.0, 0.0),
                            |(lg, lh, rg, rh), &idx| {
                                if x[[idx, feat]] > thr {
                                    (lg, lh, rg + gradients[idx], rh + hessians[idx])
                                } else {
                                    (lg + gradients[idx], lh + hessians[idx], rg, rh)
                                }
                            },
                        );
                        let parent_g = lg + rg;
                        let parent_h = lh + rh;
                        let parent_score = parent_g * parent_g / (parent_h + reg_lambda);
                        let left_score = lg * lg / (lh + reg_lambda);
                        let right_score = rg * rg / (rh + reg_lambda);
                        total_gain += left_score + right_score - parent_score;
                    }

                    if total_gain > best_gain {
                        best_gain = total_gain;
                        best_thr = thr;
                    }
                }

                if best_gain > 0.0 {
                    Some((feat, best_thr, best_gain))
                } else {
                    None
                }
            })
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((feat, thr, _)) => {
                splits.push((feat, thr));
                let mut new_buckets = Vec::with_capacity(buckets.len() * 2);
                for bucket in &buckets {
                    let (right, left): (Vec<usize>, Vec<usize>) =
                        bucket.iter().copied().partition(|&i| x[[i, feat]] > thr);
                    new_buckets.push(left);
                    new_buckets.push(right);
                }
                buckets = new_buckets;
            }
            None => break,
        }
    }

    let leaf_values: Vec<f64> = buckets
        .iter()
        .map(|bucket| {
            if bucket.is_empty() {
                return 0.0;
            }
            let g: f64 = bucket.iter().map(|&i| gradients[i]).sum();
            let h: f64 = bucket.iter().map(|&i| hessians[i]).sum();
            -g / (h + reg_lambda)
        })
        .collect();

    SymmetricTree {
        splits,
        leaf_values,
    }
}

/// Smoothed target statistics for one categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryStats {
    levels: HashMap<String, f64>,
    prior: f64,
}

const CAT_SMOOTHING: f64 = 1.0;

fn fit_category_stats(values: &StringChunked, y: &Array1<f64>) -> CategoryStats {
    let prior = y.mean().unwrap_or(0.0);
    let mut sums: HashMap<String, (f64, f64)> = HashMap::new();

    for (value, &yi) in values.into_iter().zip(y.iter()) {
        let key = value.unwrap_or(CATEGORICAL_MISSING);
        let entry = sums.entry(key.to_string()).or_insert((0.0, 0.0));
        entry.0 += yi;
        entry.1 += 1.0;
    }

    let levels = sums
        .into_iter()
        .map(|(k, (sum, count))| (k, (sum + CAT_SMOOTHING * prior) / (count + CAT_SMOOTHING)))
        .collect();

    CategoryStats { levels, prior }
}

/// Gradient-boosted binary classifier over a [`Dataset`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtClassifier {
    pub config: GbdtConfig,
    trees: Vec<SymmetricTree>,
    base_prediction: f64,
    feature_names: Vec<String>,
    cat_stats: HashMap<String, CategoryStats>,
    best_iteration: usize,
    best_score: f64,
    is_fitted: bool,
}

impl GbdtClassifier {
    pub fn new(config: GbdtConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_prediction: 0.0,
            feature_names: Vec::new(),
            cat_stats: HashMap::new(),
            best_iteration: 0,
            best_score: 0.0,
            is_fitted: false,
        }
    }

    /// Number of trees kept after best-iteration selection.
    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    /// Validation score at the best iteration.
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Fit on a training set, selecting the model on validation score.
    pub fn fit(
        &mut self,
        train: &Dataset,
        y_train: &Array1<f64>,
        valid: &Dataset,
        y_val: &Array1<f64>,
    ) -> Result<()> {
        let n = train.height();
        if n == 0 {
            return Err(ScorerError::TrainingError("empty training set".into()));
        }
        if n != y_train.len() || valid.height() != y_val.len() {
            return Err(ScorerError::TrainingError(format!(
                "feature/label row mismatch: {} vs {}, {} vs {}",
                n,
                y_train.len(),
                valid.height(),
                y_val.len()
            )));
        }

        self.feature_names = train.column_names();

        // Target statistics for categorical columns, learned on train only.
        self.cat_stats.clear();
        for name in train.cat_columns() {
            let column = train.frame().column(name)?.cast(&DataType::String)?;
            let values = column.str()?;
            self.cat_stats
                .insert(name.clone(), fit_category_stats(values, y_train));
        }

        let x_train = self.to_matrix(train.frame())?;
        let x_val = self.to_matrix(valid.frame())?;

        let pos = y_train.iter().filter(|&&v| v > 0.5).count() as f64;
        let neg = n as f64 - pos;
        self.base_prediction = (pos.max(1e-10) / neg.max(1e-10)).ln();

        let mut raw_train = Array1::from_elem(n, self.base_prediction);
        let mut raw_val = Array1::from_elem(valid.height(), self.base_prediction);

        let metric = self.config.eval_metric;
        self.trees.clear();
        self.best_iteration = 0;
        self.best_score = if metric.higher_is_better() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut rounds_without_improvement = 0usize;

        for iteration in 0..self.config.iterations {
            let probs: Vec<f64> = raw_train.iter().map(|&r| sigmoid(r)).collect();
            let gradients: Vec<f64> = probs
                .iter()
                .zip(y_train.iter())
                .map(|(&p, &yi)| p - yi)
                .collect();
            let hessians: Vec<f64> = probs.iter().map(|&p| (p * (1.0 - p)).max(1e-16)).collect();

            let tree = build_symmetric_tree(
                &x_train,
                &gradients,
                &hessians,
                self.config.max_depth,
                self.config.reg_lambda,
            );

            for (i, row) in x_train.rows().into_iter().enumerate() {
                raw_train[i] += self.config.learning_rate * tree.predict(row);
            }
            for (i, row) in x_val.rows().into_iter().enumerate() {
                raw_val[i] += self.config.learning_rate * tree.predict(row);
            }
            self.trees.push(tree);

            let val_probs: Array1<f64> = raw_val.iter().map(|&r| sigmoid(r)).collect();
            let score = metric.compute(y_val, &val_probs);

            let improved = if metric.higher_is_better() {
                score > self.best_score
            } else {
                score < self.best_score
            };
            if improved {
                self.best_score = score;
                self.best_iteration = self.trees.len();
                rounds_without_improvement = 0;
            } else {
                rounds_without_improvement += 1;
            }

            if (iteration + 1) % self.config.log_period == 0 {
                tracing::info!(
                    "iteration {}: validation {:?} = {:.6}",
                    iteration + 1,
                    metric,
                    score
                );
            }

            if let Some(patience) = self.config.early_stopping_rounds {
                if rounds_without_improvement >= patience {
                    tracing::debug!(
                        "early stop at iteration {} (best {})",
                        iteration + 1,
                        self.best_iteration
                    );
                    break;
                }
            }
        }

        // Keep the model at the best validation score.
        self.trees.truncate(self.best_iteration);
        self.is_fitted = true;
        Ok(())
    }

    /// Per-row probability of the positive class.
    pub fn predict_proba(&self, data: &Dataset) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(ScorerError::ModelNotFitted);
        }

        let x = self.to_matrix(data.frame())?;
        let proba = x
            .rows()
            .into_iter()
            .map(|row| {
                let raw: f64 = self.base_prediction
                    + self
                        .trees
                        .iter()
                        .map(|t| self.config.learning_rate * t.predict(row))
                        .sum::<f64>();
                sigmoid(raw)
            })
            .collect();
        Ok(proba)
    }

    /// Save the model artifact as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a model artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        Ok(model)
    }

    /// Extract the fit-time feature columns into a row-major matrix.
    /// Categorical columns go through their target statistics (unseen
    /// categories fall back to the prior); numeric nulls become NaN.
    fn to_matrix(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();
        let n_cols = self.feature_names.len();

        let col_data: Vec<Vec<f64>> = self
            .feature_names
            .iter()
            .map(|name| {
                let column = df
                    .column(name)
                    .map_err(|_| ScorerError::FeatureNotFound(name.clone()))?;

                if let Some(stats) = self.cat_stats.get(name) {
                    let casted = column.cast(&DataType::String)?;
                    let values = casted.str()?;
                    Ok(values
                        .into_iter()
                        .map(|v| {
                            let key = v.unwrap_or(CATEGORICAL_MISSING);
                            stats.levels.get(key).copied().unwrap_or(stats.prior)
                        })
                        .collect())
                } else {
                    let casted = column.cast(&DataType::Float64)?;
                    Ok(casted
                        .f64()?
                        .into_iter()
                        .map(|v| v.unwrap_or(f64::NAN))
                        .collect())
                }
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
        Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
            col_refs[c][r]
        }))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> GbdtConfig {
        GbdtConfig {
            iterations: 60,
            learning_rate: 0.2,
            max_depth: 3,
            early_stopping_rounds: Some(20),
            ..Default::default()
        }
    }

    fn make_training_frame() -> (Dataset, Array1<f64>) {
        let n = 80;
        let mut amounts = Vec::with_capacity(n);
        let mut grades = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);

        for i in 0..n {
            let amount = i as f64 * 100.0;
            amounts.push(amount);
            grades.push(if i % 2 == 0 { "good" } else { "bad" });
            y.push(if amount > 4000.0 || i % 2 == 1 { 1.0 } else { 0.0 });
        }

        let df = df!(
            "amount" => &amounts,
            "grade" => &grades,
        )
        .unwrap();

        (
            Dataset::new(&df, &["grade"]).unwrap(),
            Array1::from_vec(y),
        )
    }

    #[test]
    fn test_fit_and_predict_proba() {
        let (ds, y) = make_training_frame();
        let mut model = GbdtClassifier::new(small_config());
        model.fit(&ds, &y, &ds, &y).unwrap();

        let proba = model.predict_proba(&ds).unwrap();
        assert_eq!(proba.len(), 80);
        assert!(proba.iter().all(|&p| p > 0.0 && p < 1.0));
        assert!(roc_auc(&y, &proba) > 0.9);
        assert!(model.best_iteration() > 0);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let (ds, _) = make_training_frame();
        let model = GbdtClassifier::new(small_config());
        assert!(matches!(
            model.predict_proba(&ds),
            Err(ScorerError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_missing_numeric_values_train() {
        let df = df!(
            "a" => &[Some(1.0), None, Some(3.0), Some(4.0), None, Some(6.0)],
            "b" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();
        let ds = Dataset::new(&df, &[]).unwrap();
        let y = ndarray::array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = GbdtClassifier::new(small_config());
        model.fit(&ds, &y, &ds, &y).unwrap();
        let proba = model.predict_proba(&ds).unwrap();
        assert!(proba.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_unseen_category_falls_back_to_prior() {
        let (ds, y) = make_training_frame();
        let mut model = GbdtClassifier::new(small_config());
        model.fit(&ds, &y, &ds, &y).unwrap();

        let df = df!(
            "amount" => &[100.0],
            "grade" => &["unheard-of"],
        )
        .unwrap();
        let new_ds = Dataset::new(&df, &["grade"]).unwrap();
        let proba = model.predict_proba(&new_ds).unwrap();
        assert!(proba[0] > 0.0 && proba[0] < 1.0);
    }

    #[test]
    fn test_predict_missing_feature_column_fails() {
        let (ds, y) = make_training_frame();
        let mut model = GbdtClassifier::new(small_config());
        model.fit(&ds, &y, &ds, &y).unwrap();

        let df = df!("amount" => &[100.0]).unwrap();
        let incomplete = Dataset::new(&df, &[]).unwrap();
        assert!(matches!(
            model.predict_proba(&incomplete),
            Err(ScorerError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (ds, y) = make_training_frame();
        let mut model = GbdtClassifier::new(small_config());
        model.fit(&ds, &y, &ds, &y).unwrap();
        let before = model.predict_proba(&ds).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        model.save(&path).unwrap();

        let loaded = GbdtClassifier::load(&path).unwrap();
        let after = loaded.predict_proba(&ds).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
