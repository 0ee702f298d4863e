use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::error::{AppError, AppResult};

/// Shuffles `items` with a seeded RNG and splits off a held-out share
///
/// The held-out size is `ceil(len * test_fraction)`; the same seed and
/// input always give the same split.
pub fn train_test_split<T>(
    mut items: Vec<T>,
    test_fraction: f64,
    seed: u64,
) -> AppResult<(Vec<T>, Vec<T>)> {
    if !(0.0..=1.0).contains(&test_fraction) {
        return Err(AppError::InvalidInput(format!(
            "test fraction must be within [0, 1], got {}",
            test_fraction
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let test_len = (items.len() as f64 * test_fraction).ceil() as usize;
    let train = items.split_off(test_len);
    Ok((train, items))
}

/// Seeded random sample holding `round(len * fraction)` items
pub fn sample_fraction<T: Clone>(items: &[T], fraction: f64, seed: u64) -> AppResult<Vec<T>> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(AppError::InvalidInput(format!(
            "sample fraction must be within [0, 1], got {}",
            fraction
        )));
    }
    let amount = (items.len() as f64 * fraction).round() as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(items.choose_multiple(&mut rng, amount).cloned().collect())
}
