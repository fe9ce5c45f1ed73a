//! Seeded stratified train/validation split

use ndarray::Array1;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::BTreeMap;

use crate::error::{Result, ScorerError};

/// Split row indices into train and validation sets, preserving the label
/// distribution per class. Each class keeps at least one row on each side.
/// Returned index sets are sorted, so row order within each side follows the
/// input.
pub fn stratified_split(
    y: &Array1<f64>,
    val_ratio: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&val_ratio) {
        return Err(ScorerError::TrainingError(format!(
            "validation ratio must be in [0, 1), got {val_ratio}"
        )));
    }

    let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        class_indices.entry(label as i64).or_default().push(i);
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut train_indices = Vec::new();
    let mut val_indices = Vec::new();

    for indices in class_indices.values() {
        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);

        let class_val_size = ((shuffled.len() as f64) * val_ratio).round().max(1.0) as usize;
        let class_val_size = class_val_size.min(shuffled.len().saturating_sub(1));
        let split_point = shuffled.len() - class_val_size;

        train_indices.extend_from_slice(&shuffled[..split_point]);
        val_indices.extend_from_slice(&shuffled[split_point..]);
    }

    if train_indices.is_empty() || val_indices.is_empty() {
        return Err(ScorerError::TrainingError(
            "stratified split produced an empty train or validation set".to_string(),
        ));
    }

    train_indices.sort_unstable();
    val_indices.sort_unstable();
    Ok((train_indices, val_indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_neg: usize, n_pos: usize) -> Array1<f64> {
        let mut v = vec![0.0; n_neg];
        v.extend(std::iter::repeat(1.0).take(n_pos));
        Array1::from_vec(v)
    }

    #[test]
    fn test_split_is_exhaustive_and_disjoint() {
        let y = labels(40, 10);
        let (train, val) = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(train.len() + val.len(), 50);
        for i in &val {
            assert!(!train.contains(i));
        }
    }

    #[test]
    fn test_split_preserves_class_ratio() {
        let y = labels(80, 20);
        let (_, val) = stratified_split(&y, 0.2, 42).unwrap();
        let pos_in_val = val.iter().filter(|&&i| y[i] > 0.5).count();
        assert_eq!(val.len(), 20);
        assert_eq!(pos_in_val, 4);
    }

    #[test]
    fn test_split_deterministic_per_seed() {
        let y = labels(30, 30);
        let a = stratified_split(&y, 0.25, 7).unwrap();
        let b = stratified_split(&y, 0.25, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tiny_class_keeps_a_training_row() {
        let y = labels(10, 2);
        let (train, _) = stratified_split(&y, 0.5, 1).unwrap();
        assert!(train.iter().any(|&i| y[i] > 0.5));
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let y = labels(5, 5);
        assert!(stratified_split(&y, 1.0, 0).is_err());
    }
}
