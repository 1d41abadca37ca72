use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::LossFn;

/// Guard against log(0) when a predicted probability collapses to zero.
pub(crate) const LOG_EPSILON: f32 = 1e-10;

/// Categorical cross-entropy.
///
/// Assumes `y_pred` is a probability distribution, i.e. the output of a
/// softmax layer. When a network pairs this loss with a softmax output
/// layer, the backward pass composes the two into the direct output delta
/// `y_pred − y` and never calls [`LossFn::loss_prime`]; the general form
/// below is what any other output activation gets, at the cost of going
/// through the full softmax Jacobian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossEntropy;

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> f32 {
        y.iter()
            .zip(&y_pred)
            .map(|(&t, &p)| -t * (p + LOG_EPSILON).ln())
            .sum()
    }

    fn loss_prime(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> Array1<f32> {
        let mut g = y.to_owned();
        g.zip_mut_with(&y_pred, |g, &p| *g = -*g / (p + LOG_EPSILON));
        g
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arch::loss::test_util::check_gradient;
    use ndarray::array;

    #[test]
    fn gradient_matches_finite_differences() {
        check_gradient(
            &CrossEntropy,
            array![0.2, 0.5, 0.3],
            array![0.0, 1.0, 0.0],
        );
    }

    #[test]
    fn zero_probability_on_the_true_class_stays_finite() {
        let loss = CrossEntropy.loss(array![0.0, 1.0].view(), array![1.0, 0.0].view());
        assert!(loss.is_finite());
        assert!(loss > 10.0);
    }
}
