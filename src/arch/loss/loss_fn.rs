use ndarray::{Array1, ArrayView1};

/// A scalar loss over a predicted/target pair, and its gradient with respect
/// to the prediction.
pub trait LossFn {
    fn loss(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> f32;
    fn loss_prime(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> Array1<f32>;
}
