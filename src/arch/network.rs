use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use rand::Rng;

use super::layer::Dense;
use super::loss::{Loss, LossFn};
use crate::error::{NetError, Result};
use crate::optimization::OptimizerKind;

/// A feed-forward network: an input width followed by a chain of dense
/// transitions.
///
/// The network exclusively owns every trainable tensor; forward, backward
/// and optimizer steps all borrow from here. Training-session state (the
/// optimizer accumulators, the gradient buffer) lives in the trainer, not
/// in the network.
pub struct Network {
    input_size: usize,
    input_dropout: f32,
    layers: Vec<Dense>,
    loss: Loss,
    optimizer: OptimizerKind,
}

/// Per-sample state recorded by a training-mode forward pass and consumed by
/// the matching backward pass.
///
/// `activations[0]` is the raw input; `activations[k]` for k ≥ 1 is the
/// post-activation, pre-dropout output of transition k−1. `masks[k]` holds
/// the inverted-dropout mask drawn for that level (entries are 0 or
/// 1/(1−rate)), so the value actually propagated is
/// `activations[k] ⊙ masks[k]`.
pub(crate) struct ForwardCache {
    activations: Vec<Array1<f32>>,
    masks: Vec<Option<Array1<f32>>>,
}

impl ForwardCache {
    fn masked_activation(&self, level: usize) -> Array1<f32> {
        match &self.masks[level] {
            Some(mask) => &self.activations[level] * mask,
            None => self.activations[level].clone(),
        }
    }

    /// The network output this pass produced, dropout included.
    pub(crate) fn output(&self) -> Array1<f32> {
        self.masked_activation(self.activations.len() - 1)
    }
}

impl Network {
    /// Assembles a network, checking every configuration invariant: layer
    /// widths, weight/bias shapes, dropout ranges and penalty signs. Both
    /// the builder and snapshot restoration funnel through here, so a
    /// hand-edited snapshot cannot smuggle in a bad shape.
    pub(crate) fn from_parts(
        input_size: usize,
        input_dropout: f32,
        layers: Vec<Dense>,
        loss: Loss,
        optimizer: OptimizerKind,
    ) -> Result<Self> {
        if layers.is_empty() {
            return Err(NetError::EmptyTopology);
        }
        if input_size == 0 {
            return Err(NetError::ZeroWidthLayer { layer: 0 });
        }
        check_rate(0, input_dropout)?;

        let mut fan_in = input_size;
        for (i, layer) in layers.iter().enumerate() {
            let level = i + 1;
            if layer.fan_out() == 0 {
                return Err(NetError::ZeroWidthLayer { layer: level });
            }
            if layer.fan_in() != fan_in {
                return Err(NetError::SizeMismatch {
                    what: "weight matrix rows",
                    got: layer.fan_in(),
                    expected: fan_in,
                });
            }
            if let Some(biases) = layer.biases() {
                if biases.len() != layer.fan_out() {
                    return Err(NetError::SizeMismatch {
                        what: "bias vector",
                        got: biases.len(),
                        expected: layer.fan_out(),
                    });
                }
            }
            check_rate(level, layer.dropout())?;
            check_penalty(level, layer.l1())?;
            check_penalty(level, layer.l2())?;
            fan_in = layer.fan_out();
        }

        Ok(Self {
            input_size,
            input_dropout,
            layers,
            loss,
            optimizer,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(self.input_size, Dense::fan_out)
    }

    pub(crate) fn input_dropout(&self) -> f32 {
        self.input_dropout
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    pub fn optimizer(&self) -> OptimizerKind {
        self.optimizer
    }

    /// The dense transitions, input to output. Read access for persistence
    /// and inspection; mutation goes through the optimizer.
    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Dense] {
        &mut self.layers
    }

    fn check_input_width(&self, got: usize) -> Result<()> {
        if got != self.input_size {
            return Err(NetError::SizeMismatch {
                what: "input",
                got,
                expected: self.input_size,
            });
        }
        Ok(())
    }

    /// Inference-mode pass: no dropout, no cache. Callers have already
    /// validated the input width.
    fn propagate(&self, x: ArrayView1<f32>) -> Array1<f32> {
        let mut a = x.to_owned();
        for layer in &self.layers {
            let mut z = a.dot(&layer.weights());
            if let Some(b) = layer.biases() {
                z += &b;
            }
            a = layer.activation().apply(z);
        }
        a
    }

    /// Runs a single sample in inference mode.
    ///
    /// Deterministic: repeated calls on the same input return the same
    /// output regardless of any configured dropout.
    pub fn run(&self, x: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_input_width(x.len())?;
        Ok(self.propagate(x))
    }

    /// Runs a batch of row-stacked samples in inference mode.
    ///
    /// Rows are independent, so they are evaluated in parallel; each row's
    /// result is identical to a [`Network::run`] call on that row.
    pub fn run_batch(&self, xs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input_width(xs.ncols())?;

        let mut out = Array2::zeros((xs.nrows(), self.output_size()));
        Zip::from(out.rows_mut())
            .and(xs.rows())
            .par_for_each(|mut o, x| o.assign(&self.propagate(x)));
        Ok(out)
    }

    /// Training-mode pass: records per-level activations and draws the
    /// inverted-dropout masks the matching backward pass will reuse.
    pub(crate) fn forward_train<R: Rng + ?Sized>(
        &self,
        x: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<ForwardCache> {
        self.check_input_width(x.len())?;

        let levels = self.layers.len() + 1;
        let mut activations = Vec::with_capacity(levels);
        let mut masks = Vec::with_capacity(levels);

        activations.push(x.to_owned());
        masks.push(draw_mask(x.len(), self.input_dropout, rng));

        for (k, layer) in self.layers.iter().enumerate() {
            let prev = match &masks[k] {
                Some(mask) => &activations[k] * mask,
                None => activations[k].clone(),
            };

            let mut z = prev.dot(&layer.weights());
            if let Some(b) = layer.biases() {
                z += &b;
            }

            activations.push(layer.activation().apply(z));
            masks.push(draw_mask(layer.fan_out(), layer.dropout(), rng));
        }

        Ok(ForwardCache { activations, masks })
    }

    /// Accumulates this sample's parameter gradients into `grads` via the
    /// chain rule, L1/L2 penalty terms included. The trainer divides the
    /// buffer by the batch length afterwards, so penalties land exactly once
    /// per batch.
    pub(crate) fn backward(
        &self,
        cache: &ForwardCache,
        y: ArrayView1<f32>,
        grads: &mut Gradients,
    ) {
        let mut delta = self.output_delta(cache, y);

        for i in (0..self.layers.len()).rev() {
            let layer = &self.layers[i];
            let input = cache.masked_activation(i);

            grads.weights[i] += &outer(input.view(), delta.view());
            if layer.l1() > 0.0 || layer.l2() > 0.0 {
                let (l1, l2) = (layer.l1(), layer.l2());
                Zip::from(&mut grads.weights[i])
                    .and(layer.weights())
                    .for_each(|g, &w| *g += l1 * sign(w) + l2 * w);
            }
            if let Some(gb) = grads.biases[i].as_mut() {
                *gb += &delta;
            }

            if i > 0 {
                let back = layer.weights().dot(&delta);
                let prev_act = self.layers[i - 1].activation();
                delta = prev_act.backprop(cache.activations[i].view(), back.view());
                if let Some(mask) = &cache.masks[i] {
                    delta *= mask;
                }
            }
        }
    }

    /// Error at the output layer.
    ///
    /// Cross-entropy over a softmax output collapses to `y_pred − y`; every
    /// other pairing composes the loss gradient with the activation's
    /// backward pass.
    fn output_delta(&self, cache: &ForwardCache, y: ArrayView1<f32>) -> Array1<f32> {
        let last = self.layers.len();
        let y_pred = cache.masked_activation(last);
        let act = self.layers[last - 1].activation();

        let mut delta = if matches!(self.loss, Loss::CrossEntropy(_)) && act.is_softmax() {
            &y_pred - &y
        } else {
            let g = self.loss.loss_prime(y_pred.view(), y);
            act.backprop(cache.activations[last].view(), g.view())
        };

        if let Some(mask) = &cache.masks[last] {
            delta *= mask;
        }
        delta
    }

    /// One-line description of the model: layer shape, parameter count,
    /// loss and optimizer selections.
    pub fn summary(&self) -> String {
        let mut shape = self.input_size.to_string();
        for layer in &self.layers {
            shape.push('x');
            shape.push_str(&layer.fan_out().to_string());
        }

        let params: usize = self
            .layers
            .iter()
            .map(|l| l.weights().len() + l.biases().map_or(0, |b| b.len()))
            .sum();

        format!(
            "feed forward {shape} | {params} parameters | loss: {} | optimizer: {}",
            self.loss, self.optimizer
        )
    }
}

/// Gradient buffer whose tensors mirror the network's weight and bias shapes
/// exactly. Optimizer state reuses this type for its accumulators.
pub struct Gradients {
    pub(crate) weights: Vec<Array2<f32>>,
    pub(crate) biases: Vec<Option<Array1<f32>>>,
}

impl Gradients {
    /// Weight tensor per transition, input to output.
    pub fn weights(&self) -> &[Array2<f32>] {
        &self.weights
    }

    /// Bias tensor per transition; `None` where bias is disabled.
    pub fn biases(&self) -> &[Option<Array1<f32>>] {
        &self.biases
    }

    pub fn zeros_like(net: &Network) -> Self {
        let weights = net
            .layers()
            .iter()
            .map(|l| Array2::zeros(l.weights().raw_dim()))
            .collect();
        let biases = net
            .layers()
            .iter()
            .map(|l| l.biases().map(|b| Array1::zeros(b.len())))
            .collect();

        Self { weights, biases }
    }

    pub fn zero(&mut self) {
        for w in &mut self.weights {
            w.fill(0.0);
        }
        for b in self.biases.iter_mut().flatten() {
            b.fill(0.0);
        }
    }

    pub fn scale(&mut self, factor: f32) {
        for w in &mut self.weights {
            w.mapv_inplace(|v| v * factor);
        }
        for b in self.biases.iter_mut().flatten() {
            b.mapv_inplace(|v| v * factor);
        }
    }
}

fn check_rate(layer: usize, rate: f32) -> Result<()> {
    if !(0.0..1.0).contains(&rate) {
        return Err(NetError::InvalidDropout { layer, rate });
    }
    Ok(())
}

fn check_penalty(layer: usize, value: f32) -> Result<()> {
    if !(value >= 0.0) {
        return Err(NetError::InvalidPenalty { layer, value });
    }
    Ok(())
}

/// Subgradient convention for the L1 term and the MAE-style sign: zero at
/// exactly zero.
fn sign(w: f32) -> f32 {
    if w == 0.0 { 0.0 } else { w.signum() }
}

/// Inverted-dropout mask: entries are 1/(1−rate) with probability 1−rate
/// and 0 otherwise, so the expected activation magnitude is unchanged.
fn draw_mask<R: Rng + ?Sized>(len: usize, rate: f32, rng: &mut R) -> Option<Array1<f32>> {
    if rate <= 0.0 {
        return None;
    }

    let keep = 1.0 - rate;
    let scale = keep.recip();
    Some(Array1::from_shape_fn(len, |_| {
        if rng.random::<f32>() < keep { scale } else { 0.0 }
    }))
}

/// Column vector times row vector.
fn outer(v: ArrayView1<f32>, w: ArrayView1<f32>) -> Array2<f32> {
    let v = v.to_shape((v.len(), 1)).unwrap();
    let w = w.to_shape((1, w.len())).unwrap();
    v.dot(&w)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arch::NetworkBuilder;
    use crate::arch::activations::ActFn;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn toy_net(dropout: f32) -> Network {
        NetworkBuilder::new(2)
            .layer(crate::arch::LayerSpec::new(3, ActFn::sigmoid()).dropout(dropout))
            .dense(1, ActFn::sigmoid())
            .seed(5)
            .build()
            .unwrap()
    }

    #[test]
    fn outer_product_shape_and_values() {
        let o = outer(array![1., 2., 3.].view(), array![4., 5.].view());
        assert_eq!(o, array![[4., 5.], [8., 10.], [12., 15.]]);
    }

    #[test]
    fn mismatched_input_width_is_fatal() {
        let net = toy_net(0.0);
        assert!(matches!(
            net.run(array![1.0, 2.0, 3.0].view()),
            Err(NetError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn training_masks_are_zero_or_rescaled() {
        let net = toy_net(0.5);
        let mut rng = StdRng::seed_from_u64(9);
        let cache = net
            .forward_train(array![0.3, 0.7].view(), &mut rng)
            .unwrap();

        let mask = cache.masks[1].as_ref().expect("hidden layer has dropout");
        assert_eq!(mask.len(), 3);
        assert!(mask.iter().all(|&m| m == 0.0 || m == 2.0));
        assert!(cache.masks[0].is_none());
        assert!(cache.masks[2].is_none());
    }

    #[test]
    fn gradient_buffer_mirrors_parameter_shapes() {
        let net = toy_net(0.0);
        let grads = Gradients::zeros_like(&net);
        for (layer, gw) in net.layers().iter().zip(&grads.weights) {
            assert_eq!(layer.weights().raw_dim(), gw.raw_dim());
        }
        for (layer, gb) in net.layers().iter().zip(&grads.biases) {
            assert_eq!(
                layer.biases().map(|b| b.len()),
                gb.as_ref().map(|b| b.len())
            );
        }
    }

    #[test]
    fn backward_fills_every_gradient_tensor() {
        let net = toy_net(0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut grads = Gradients::zeros_like(&net);

        let cache = net
            .forward_train(array![0.3, 0.7].view(), &mut rng)
            .unwrap();
        net.backward(&cache, array![1.0].view(), &mut grads);

        assert!(grads.weights.iter().all(|w| w.iter().any(|&g| g != 0.0)));
    }
}
