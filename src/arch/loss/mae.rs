use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::LossFn;

/// Mean absolute error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mae;

impl LossFn for Mae {
    fn loss(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> f32 {
        (&y_pred - &y)
            .mapv(f32::abs)
            .mean()
            .unwrap_or_default()
    }

    /// `sign(pred − target)/n`, zero at exact equality.
    fn loss_prime(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> Array1<f32> {
        let n = y_pred.len() as f32;
        (&y_pred - &y).mapv(|d| if d == 0.0 { 0.0 } else { d.signum() / n })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arch::loss::test_util::check_gradient;
    use ndarray::array;

    #[test]
    fn gradient_matches_finite_differences() {
        check_gradient(&Mae, array![0.3, -0.4, 0.9], array![0.0, 0.5, 1.0]);
    }

    #[test]
    fn gradient_is_zero_at_exact_equality() {
        let y = array![0.5, -0.5];
        let g = Mae.loss_prime(y.view(), y.view());
        assert_eq!(g, array![0.0, 0.0]);
    }
}
