use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Adagrad, Adam, Momentum, RmsProp};
use crate::arch::{Gradients, Network};
use crate::error::NetError;

/// Default denominator guard shared by the accumulator-based rules.
pub(crate) const EPSILON: f32 = 1e-8;

/// The closed set of optimizer update rules, with their hyperparameters.
///
/// The selection is model-wide: one rule applies identically to every
/// weight and bias element. The per-parameter state lives in the resolved
/// [`Optimizer`] and is allocated fresh at every `train` call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum OptimizerKind {
    Momentum { coefficient: f32 },
    RmsProp { decay: f32, epsilon: f32 },
    Adagrad { epsilon: f32 },
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
}

impl OptimizerKind {
    pub fn momentum(coefficient: f32) -> Self {
        Self::Momentum { coefficient }
    }

    pub fn rmsprop() -> Self {
        Self::RmsProp {
            decay: 0.9,
            epsilon: EPSILON,
        }
    }

    pub fn adagrad() -> Self {
        Self::Adagrad { epsilon: EPSILON }
    }

    pub fn adam() -> Self {
        Self::Adam {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: EPSILON,
        }
    }

    /// Allocates the rule's zeroed state tensors for `net`'s parameters.
    pub fn resolve(&self, net: &Network) -> Optimizer {
        match *self {
            OptimizerKind::Momentum { coefficient } => {
                Optimizer::Momentum(Momentum::new(coefficient, net))
            }
            OptimizerKind::RmsProp { decay, epsilon } => {
                Optimizer::RmsProp(RmsProp::new(decay, epsilon, net))
            }
            OptimizerKind::Adagrad { epsilon } => Optimizer::Adagrad(Adagrad::new(epsilon, net)),
            OptimizerKind::Adam {
                beta1,
                beta2,
                epsilon,
            } => Optimizer::Adam(Adam::new(beta1, beta2, epsilon, net)),
        }
    }
}

impl Default for OptimizerKind {
    fn default() -> Self {
        Self::momentum(0.6)
    }
}

impl FromStr for OptimizerKind {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "momentum" => Ok(Self::default()),
            "rmsprop" => Ok(Self::rmsprop()),
            "adagrad" => Ok(Self::adagrad()),
            "adam" => Ok(Self::adam()),
            _ => Err(NetError::UnknownOptimizer(s.to_string())),
        }
    }
}

impl Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerKind::Momentum { .. } => "momentum",
            OptimizerKind::RmsProp { .. } => "rmsprop",
            OptimizerKind::Adagrad { .. } => "adagrad",
            OptimizerKind::Adam { .. } => "adam",
        };
        write!(f, "{name}")
    }
}

/// A resolved update rule plus its per-parameter state.
pub enum Optimizer {
    Momentum(Momentum),
    RmsProp(RmsProp),
    Adagrad(Adagrad),
    Adam(Adam),
}

impl Optimizer {
    /// Applies one update step to every parameter tensor. `grads` must
    /// already be normalized over the batch.
    pub fn step(&mut self, net: &mut Network, grads: &Gradients, learning_rate: f32) {
        match self {
            Optimizer::Momentum(o) => o.step(net, grads, learning_rate),
            Optimizer::RmsProp(o) => o.step(net, grads, learning_rate),
            Optimizer::Adagrad(o) => o.step(net, grads, learning_rate),
            Optimizer::Adam(o) => o.step(net, grads, learning_rate),
        }
    }
}
