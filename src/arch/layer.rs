use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::activations::ActFn;

/// One dense transition together with the settings that apply to its output
/// neurons.
///
/// Dropout and penalty coefficients live on the layer itself, next to the
/// tensors they modify, instead of in position-indexed side lists.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dense {
    weights: Array2<f32>,
    biases: Option<Array1<f32>>,
    act: ActFn,
    dropout: f32,
    l1: f32,
    l2: f32,
}

impl Dense {
    /// Allocates a `fan_in × fan_out` transition with normally distributed
    /// weights scaled by 1/√fan_in and zeroed biases.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn init<R: Rng + ?Sized>(
        fan_in: usize,
        fan_out: usize,
        act: ActFn,
        dropout: f32,
        l1: f32,
        l2: f32,
        use_bias: bool,
        rng: &mut R,
    ) -> Self {
        let scale = (fan_in as f32).sqrt().recip();
        let weights = Array2::<f32>::random_using((fan_in, fan_out), StandardNormal, rng) * scale;
        let biases = use_bias.then(|| Array1::zeros(fan_out));

        Self {
            weights,
            biases,
            act,
            dropout,
            l1,
            l2,
        }
    }

    pub fn fan_in(&self) -> usize {
        self.weights.nrows()
    }

    pub fn fan_out(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> ArrayView2<'_, f32> {
        self.weights.view()
    }

    pub fn biases(&self) -> Option<ArrayView1<'_, f32>> {
        self.biases.as_ref().map(|b| b.view())
    }

    pub(crate) fn weights_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.weights.view_mut()
    }

    pub(crate) fn biases_mut(&mut self) -> Option<ArrayViewMut1<'_, f32>> {
        self.biases.as_mut().map(|b| b.view_mut())
    }

    pub fn activation(&self) -> &ActFn {
        &self.act
    }

    pub fn dropout(&self) -> f32 {
        self.dropout
    }

    pub fn l1(&self) -> f32 {
        self.l1
    }

    pub fn l2(&self) -> f32 {
        self.l2
    }
}
