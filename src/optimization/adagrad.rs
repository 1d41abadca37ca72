use ndarray::Zip;

use crate::arch::{Gradients, Network};

/// Adagrad: a monotonically growing sum of squared gradients, so frequently
/// updated parameters take ever smaller steps.
///
/// `acc += g²; p −= lr·g/(√acc + ε)`
pub struct Adagrad {
    epsilon: f32,
    accumulator: Gradients,
}

impl Adagrad {
    pub(crate) fn new(epsilon: f32, net: &Network) -> Self {
        Self {
            epsilon,
            accumulator: Gradients::zeros_like(net),
        }
    }

    /// Read access to the rule's state tensors, shaped like the parameters.
    pub fn state(&self) -> &Gradients {
        &self.accumulator
    }

    pub(crate) fn step(&mut self, net: &mut Network, grads: &Gradients, lr: f32) {
        let epsilon = self.epsilon;
        let rule = move |p: &mut f32, acc: &mut f32, &g: &f32| {
            *acc += g * g;
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::optimization::optimizer::EPSILON;
    use crate::optimization::test_util::{descend_parabola, minimum_distance};

    #[test]
    fn finds_the_parabola_minimum() {
        let net = descend_parabola(
            |net| Adagrad::new(EPSILON, net),
            |o, net, grads, lr| o.step(net, grads, lr),
            0.5,
            500,
        );
        assert!(minimum_distance(&net) < 0.05);
    }
}
