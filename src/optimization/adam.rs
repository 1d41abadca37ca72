use ndarray::Zip;

use crate::arch::{Gradients, Network};

/// Adam: exponential moving estimates of the first and second gradient
/// moments, bias-corrected for the cold start.
///
/// `m = β1·m + (1−β1)·g; v = β2·v + (1−β2)·g²;`
/// `p −= lr·(m/(1−β1^t)) / (√(v/(1−β2^t)) + ε)`
pub struct Adam {
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: i32,
    first_moment: Gradients,
    second_moment: Gradients,
}

impl Adam {
    pub(crate) fn new(beta1: f32, beta2: f32, epsilon: f32, net: &Network) -> Self {
        Self {
            beta1,
            beta2,
            epsilon,
            t: 0,
            first_moment: Gradients::zeros_like(net),
            second_moment: Gradients::zeros_like(net),
        }
    }

    /// Read access to the first-moment tensors, shaped like the parameters.
    pub fn state(&self) -> &Gradients {
        &self.first_moment
    }

    /// Read access to the second-moment tensors.
    pub fn second_moment(&self) -> &Gradients {
        &self.second_moment
    }

    pub(crate) fn step(&mut self, net: &mut Network, grads: &Gradients, lr: f32) {
        self.t += 1;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let correction1 = 1. - beta1.powi(self.t);
        let correction2 = 1. - beta2.powi(self.t);

        let rule = move |p: &mut f32, m: &mut f32, v: &mut f32, &g: &f32| {
            *m = beta1 * *m + (1. - beta1) * g;
            *v = beta2 * *v + (1. - beta2) * g * g;
            let m_hat = *m / correction1;
            let v_hat = *v / correction2;
            *p -= lr * m_hat / (v_hat.sqrt() + epsilon);
        };

        for (i, layer) in net.layers_mut().iter_mut().enumerate() {
            Zip::from(layer.weights_mut())
                .and(&mut self.first_moment.weights[i])
                .and(&mut self.second_moment.weights[i])
                .and(&grads.weights[i])
                .for_each(rule);

            if let (Some(b), Some(mb), Some(vb), Some(gb)) = (
                layer.biases_mut(),
                self.first_moment.biases[i].as_mut(),
                self.second_moment.biases[i].as_mut(),
                grads.biases[i].as_ref(),
            ) {
                Zip::from(b).and(mb).and(vb).and(gb).for_each(rule);
            }
        }
    }
}
