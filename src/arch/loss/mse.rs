use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::LossFn;

/// Mean squared error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mse;

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> f32 {
        (&y_pred - &y)
            .mapv(|d| d * d)
            .mean()
            .unwrap_or_default()
    }

    fn loss_prime(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> Array1<f32> {
        (&y_pred - &y) * (2.0 / y_pred.len() as f32)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arch::loss::test_util::check_gradient;
    use ndarray::array;

    #[test]
    fn loss_of_exact_prediction_is_zero() {
        let y = array![0.2, 0.8];
        assert_eq!(Mse.loss(y.view(), y.view()), 0.0);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        check_gradient(&Mse, array![0.3, -0.4, 0.9], array![0.0, 0.5, 1.0]);
    }
}
