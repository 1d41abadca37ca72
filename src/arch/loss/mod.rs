use std::fmt::{self, Display};
use std::str::FromStr;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

mod cross_entropy;
mod loss_fn;
mod mae;
mod mse;

pub use cross_entropy::CrossEntropy;
pub use loss_fn::LossFn;
pub use mae::Mae;
pub use mse::Mse;

use crate::error::NetError;

/// The closed set of loss functions, selected at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Loss {
    Mse(Mse),
    Mae(Mae),
    CrossEntropy(CrossEntropy),
}

impl Loss {
    pub fn mse() -> Self {
        Self::Mse(Mse)
    }

    pub fn mae() -> Self {
        Self::Mae(Mae)
    }

    pub fn cross_entropy() -> Self {
        Self::CrossEntropy(CrossEntropy)
    }
}

impl Default for Loss {
    fn default() -> Self {
        Self::mse()
    }
}

impl LossFn for Loss {
    fn loss(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> f32 {
        match self {
            Loss::Mse(l) => l.loss(y_pred, y),
            Loss::Mae(l) => l.loss(y_pred, y),
            Loss::CrossEntropy(l) => l.loss(y_pred, y),
        }
    }

    fn loss_prime(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> Array1<f32> {
        match self {
            Loss::Mse(l) => l.loss_prime(y_pred, y),
            Loss::Mae(l) => l.loss_prime(y_pred, y),
            Loss::CrossEntropy(l) => l.loss_prime(y_pred, y),
        }
    }
}

impl FromStr for Loss {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean square error" | "mse" => Ok(Self::mse()),
            "mean absolute error" | "mae" => Ok(Self::mae()),
            "categorical cross entropy" | "cross entropy" => Ok(Self::cross_entropy()),
            _ => Err(NetError::UnknownLoss(s.to_string())),
        }
    }
}

impl Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Loss::Mse(_) => "mean square error",
            Loss::Mae(_) => "mean absolute error",
            Loss::CrossEntropy(_) => "categorical cross entropy",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::LossFn;
    use ndarray::Array1;

    /// Asserts that `loss_prime` matches a central finite difference of
    /// `loss` in every component.
    pub(crate) fn check_gradient(loss: &impl LossFn, y_pred: Array1<f32>, y: Array1<f32>) {
        let analytic = loss.loss_prime(y_pred.view(), y.view());
        let h = 1e-3_f32;

        for i in 0..y_pred.len() {
            let mut plus = y_pred.clone();
            plus[i] += h;
            let mut minus = y_pred.clone();
            minus[i] -= h;

            let numeric = (loss.loss(plus.view(), y.view()) as f64
                - loss.loss(minus.view(), y.view()) as f64)
                / (2.0 * h as f64);
            assert!(
                (numeric as f32 - analytic[i]).abs() < 1e-3,
                "component {i}: numeric {numeric} vs analytic {}",
                analytic[i]
            );
        }
    }
}
