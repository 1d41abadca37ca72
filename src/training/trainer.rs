use std::num::NonZeroUsize;

use log::{debug, info};
use ndarray::ArrayView1;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::History;
use crate::arch::loss::{Loss, LossFn};
use crate::arch::{Gradients, Network};
use crate::dataset::Dataset;
use crate::error::{NetError, Result};

const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(32).unwrap();

/// Drives epochs and mini-batches over a network.
///
/// The trainer owns the run's RNG (shuffling and dropout masks) and the
/// session-scoped numeric state; the optimizer accumulators are allocated
/// fresh at every [`Trainer::train`] call.
pub struct Trainer {
    epochs: usize,
    learning_rate: f32,
    batch_size: NonZeroUsize,
    verbose: bool,
    rng: StdRng,
}

impl Trainer {
    pub fn new(epochs: usize, learning_rate: f32) -> Self {
        Self {
            epochs,
            learning_rate,
            batch_size: DEFAULT_BATCH_SIZE,
            verbose: false,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Emits per-epoch progress through `log` when enabled.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Pins the shuffle/dropout RNG for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Trains `net` on `train` for the configured number of epochs,
    /// evaluating on `test` after each epoch when provided.
    ///
    /// Per batch: gradients are accumulated over every sample, divided by
    /// the batch length, and applied in a single optimizer step, so the
    /// parameter and optimizer state stay consistent at batch granularity.
    ///
    /// # Errors
    /// Sample widths that do not match the network, or an empty training
    /// set. Both are checked before the epoch loop begins.
    pub fn train(
        &mut self,
        net: &mut Network,
        train: &mut Dataset,
        test: Option<&Dataset>,
    ) -> Result<History> {
        check_dims(net, train, "training inputs", "training targets")?;
        if train.is_empty() {
            return Err(NetError::EmptyDataset);
        }
        if let Some(test) = test {
            check_dims(net, test, "test inputs", "test targets")?;
        }

        let mut optimizer = net.optimizer().resolve(net);
        let mut grads = Gradients::zeros_like(net);
        let mut history = History::default();

        for epoch in 1..=self.epochs {
            train.shuffle(&mut self.rng);

            let mut epoch_loss = 0.0;
            let mut batches = 0usize;

            for batch in train.batches(self.batch_size) {
                grads.zero();
                let mut batch_loss = 0.0;

                for &index in batch {
                    let (x, y) = train.sample(index);
                    let cache = net.forward_train(x, &mut self.rng)?;
                    batch_loss += net.loss().loss(cache.output().view(), y);
                    net.backward(&cache, y, &mut grads);
                }

                let n = batch.len() as f32;
                grads.scale(n.recip());
                optimizer.step(net, &grads, self.learning_rate);

                epoch_loss += batch_loss / n;
                batches += 1;
            }

            let train_loss = epoch_loss / batches as f32;
            history.push_train_loss(train_loss);
            debug!(epoch = epoch, batches = batches; "epoch complete");

            if let Some(test) = test {
                let (test_loss, accuracy) = evaluate(net, test)?;
                history.push_evaluation(test_loss, accuracy);
                if self.verbose {
                    info!(
                        "epoch {epoch}/{}: loss={train_loss:.6} test_loss={test_loss:.6} accuracy={accuracy:.4}",
                        self.epochs
                    );
                }
            } else if self.verbose {
                info!("epoch {epoch}/{}: loss={train_loss:.6}", self.epochs);
            }
        }

        Ok(history)
    }
}

fn check_dims(
    net: &Network,
    data: &Dataset,
    inputs: &'static str,
    targets: &'static str,
) -> Result<()> {
    if data.x_size() != net.input_size() {
        return Err(NetError::SizeMismatch {
            what: inputs,
            got: data.x_size(),
            expected: net.input_size(),
        });
    }
    if data.y_size() != net.output_size() {
        return Err(NetError::SizeMismatch {
            what: targets,
            got: data.y_size(),
            expected: net.output_size(),
        });
    }
    Ok(())
}

/// Mean loss and accuracy over a dataset, inference mode only: no dropout,
/// no gradient or cache side effects.
pub fn evaluate(net: &Network, data: &Dataset) -> Result<(f32, f32)> {
    let loss_fn = net.loss();
    let mut total_loss = 0.0;
    let mut total_accuracy = 0.0;

    for index in 0..data.len() {
        let (x, y) = data.sample(index);
        let y_pred = net.run(x)?;
        total_loss += loss_fn.loss(y_pred.view(), y);
        total_accuracy += sample_accuracy(loss_fn, y_pred.view(), y);
    }

    let n = data.len().max(1) as f32;
    Ok((total_loss / n, total_accuracy / n))
}

/// Classification targets score by argmax agreement; regression-style
/// targets score by relative closeness.
fn sample_accuracy(loss: Loss, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> f32 {
    match loss {
        Loss::CrossEntropy(_) => {
            if argmax(y_pred) == argmax(y) {
                1.0
            } else {
                0.0
            }
        }
        _ => {
            let closeness = y_pred
                .iter()
                .zip(&y)
                .map(|(&p, &t)| (1.0 - (p - t).abs() / (t.abs() + 1.0)).clamp(0.0, 1.0))
                .sum::<f32>();
            closeness / y_pred.len() as f32
        }
    }
}

fn argmax(v: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &value) in v.iter().enumerate() {
        if value > v[best] {
            best = i;
        }
    }
    best
}
