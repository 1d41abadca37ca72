/// Per-epoch training metrics.
///
/// Append-only: one `train_loss` entry per epoch, plus one `test_loss` and
/// `accuracy` entry per epoch when a held-out set was provided. Consumed by
/// external plotting; the engine itself renders nothing.
#[derive(Clone, Debug, Default)]
pub struct History {
    train_loss: Vec<f32>,
    test_loss: Vec<f32>,
    accuracy: Vec<f32>,
}

impl History {
    pub(crate) fn push_train_loss(&mut self, loss: f32) {
        self.train_loss.push(loss);
    }

    pub(crate) fn push_evaluation(&mut self, loss: f32, accuracy: f32) {
        self.test_loss.push(loss);
        self.accuracy.push(accuracy);
    }

    /// Mean training loss of each epoch.
    pub fn train_loss(&self) -> &[f32] {
        &self.train_loss
    }

    /// Mean held-out loss after each epoch; empty when no test set was given.
    pub fn test_loss(&self) -> &[f32] {
        &self.test_loss
    }

    /// Held-out accuracy after each epoch; empty when no test set was given.
    pub fn accuracy(&self) -> &[f32] {
        &self.accuracy
    }

    /// Number of completed epochs.
    pub fn epochs(&self) -> usize {
        self.train_loss.len()
    }
}
