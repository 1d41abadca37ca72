use ndarray::Zip;

use crate::arch::{Gradients, Network};

/// Classical momentum: a velocity tensor per parameter accumulates a
/// decaying sum of past gradient steps.
///
/// `v = coefficient·v − lr·g; p += v`
pub struct Momentum {
    coefficient: f32,
    velocity: Gradients,
}

impl Momentum {
    pub(crate) fn new(coefficient: f32, net: &Network) -> Self {
        Self {
            coefficient,
            velocity: Gradients::zeros_like(net),
        }
    }

    /// Read access to the rule's state tensors, shaped like the parameters.
    pub fn state(&self) -> &Gradients {
        &self.velocity
    }

    pub(crate) fn step(&mut self, net: &mut Network, grads: &Gradients, lr: f32) {
        let coefficient = self.coefficient;

        for (i, layer) in net.layers_mut().iter_mut().enumerate() {
            Zip::from(layer.weights_mut())
                .and(&mut self.velocity.weights[i])
                .and(&grads.weights[i])
                .for_each(|p, v, &g| {
                    *v = coefficient * *v - lr * g;
                    *p += *v;
                });

            if let (Some(b), Some(vb), Some(gb)) = (
                layer.biases_mut(),
                self.velocity.biases[i].as_mut(),
                grads.biases[i].as_ref(),
            ) {
                Zip::from(b).and(vb).and(gb).for_each(|p, v, &g| {
                    *v = coefficient * *v - lr * g;
                    *p += *v;
                });
            }
        }
    }
}
