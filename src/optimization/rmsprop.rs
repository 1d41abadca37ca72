use ndarray::Zip;

use crate::arch::{Gradients, Network};

/// RMSProp: a moving average of squared gradients normalizes each step.
///
/// `acc = decay·acc + (1−decay)·g²; p −= lr·g/(√acc + ε)`
pub struct RmsProp {
    decay: f32,
    epsilon: f32,
    accumulator: Gradients,
}

impl RmsProp {
    pub(crate) fn new(decay: f32, epsilon: f32, net: &Network) -> Self {
        Self {
            decay,
            epsilon,
            accumulator: Gradients::zeros_like(net),
        }
    }

    /// Read access to the rule's state tensors, shaped like the parameters.
    pub fn state(&self) -> &Gradients {
        &self.accumulator
    }

    pub(crate) fn step(&mut self, net: &mut Network, grads: &Gradients, lr: f32) {
        let (decay, epsilon) = (self.decay, self.epsilon);
        let rule = move |p: &mut f32, acc: &mut f32, &g: &f32| {
            *acc = decay * *acc + (1. - decay) * g * g;
            *p -= lr * g / (acc.sqrt() + epsilon);
        };

        for (i, layer) in net.layers_mut().iter_mut().enumerate() {
            Zip::from(layer.weights_mut())
                .and(&mut self.accumulator.weights[i])
                .and(&grads.weights[i])
                .for_each(rule);

            if let (Some(b), Some(ab), Some(gb)) = (
                layer.biases_mut(),
                self.accumulator.biases[i].as_mut(),
                grads.biases[i].as_ref(),
            ) {
                Zip::from(b).and(ab).and(gb).for_each(rule);
            }
        }
    }
}
