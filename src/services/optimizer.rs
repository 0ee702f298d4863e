use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView1, Zip};

/// Adam hyperparameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

/// Gradients for the rows of one embedding table touched by a batch
#[derive(Debug, Default)]
pub struct RowGradients {
    rows: BTreeMap<usize, Array1<f32>>,
}

impl RowGradients {
    /// Adds `scale * direction` to the gradient of `row`
    pub fn accumulate(&mut self, row: usize, scale: f32, direction: ArrayView1<'_, f32>) {
        match self.rows.entry(row) {
            Entry::Occupied(entry) => entry.into_mut().scaled_add(scale, &direction),
            Entry::Vacant(entry) => {
                entry.insert(direction.mapv(|x| x * scale));
            }
        }
    }
}

/// First and second moment estimates for one parameter table
#[derive(Debug, Clone)]
pub struct Moments {
    first: Array2<f32>,
    second: Array2<f32>,
}

impl Moments {
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self {
            first: Array2::zeros(shape),
            second: Array2::zeros(shape),
        }
    }
}

/// Adam optimizer applied lazily to embedding rows
///
/// Only rows with a gradient in the current step have their moments and
/// parameters updated. Bias correction uses the global step count.
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    step: i32,
}

impl Adam {
    pub fn new(config: AdamConfig) -> Self {
        Self { config, step: 0 }
    }

    pub fn step_count(&self) -> i32 {
        self.step
    }

    /// Advances the step counter and returns the bias-corrected step size
    pub fn advance(&mut self) -> f32 {
        self.step += 1;
        let c = &self.config;
        c.learning_rate * (1.0 - c.beta2.powi(self.step)).sqrt() / (1.0 - c.beta1.powi(self.step))
    }

    /// Applies one update with the step size returned by `advance`
    pub fn apply(
        &self,
        step_size: f32,
        params: &mut Array2<f32>,
        moments: &mut Moments,
        grads: &RowGradients,
    ) {
        let AdamConfig {
            beta1,
            beta2,
            epsilon,
            ..
        } = self.config;

        for (&row, grad) in &grads.rows {
            Zip::from(params.row_mut(row))
                .and(moments.first.row_mut(row))
                .and(moments.second.row_mut(row))
                .and(grad)
                .for_each(|p, m, v, &g| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    *p -= step_size * *m / (v.sqrt() + epsilon);
                });
        }
    }
}
