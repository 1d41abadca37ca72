use std::fmt::{self, Display};
use std::str::FromStr;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::{LeakyRelu, Linear, Relu, Sigmoid, Softmax, Tanh};
use crate::error::NetError;

/// The closed set of activation functions a layer can use.
///
/// Resolved once when the network is built; the hot loops dispatch on the
/// variant, never on a name.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActFn {
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    Relu(Relu),
    LeakyRelu(LeakyRelu),
    Linear(Linear),
    Softmax(Softmax),
}

impl ActFn {
    pub fn sigmoid() -> Self {
        Self::Sigmoid(Sigmoid)
    }

    pub fn tanh() -> Self {
        Self::Tanh(Tanh)
    }

    pub fn relu() -> Self {
        Self::Relu(Relu)
    }

    pub fn leaky_relu() -> Self {
        Self::LeakyRelu(LeakyRelu::default())
    }

    pub fn linear() -> Self {
        Self::Linear(Linear)
    }

    pub fn softmax() -> Self {
        Self::Softmax(Softmax)
    }

    pub(crate) fn is_softmax(&self) -> bool {
        matches!(self, ActFn::Softmax(_))
    }

    /// Applies the function to a pre-activation vector.
    ///
    /// Elementwise for every kind except softmax, which is computed jointly
    /// across the vector.
    pub fn apply(&self, z: Array1<f32>) -> Array1<f32> {
        match self {
            ActFn::Sigmoid(a) => z.mapv_into(|v| a.f(v)),
            ActFn::Tanh(a) => z.mapv_into(|v| a.f(v)),
            ActFn::Relu(a) => z.mapv_into(|v| a.f(v)),
            ActFn::LeakyRelu(a) => z.mapv_into(|v| a.f(v)),
            ActFn::Linear(a) => z.mapv_into(|v| a.f(v)),
            ActFn::Softmax(a) => a.apply(z),
        }
    }

    /// Multiplies `upstream` by the derivative evaluated at the cached
    /// activation `a`.
    ///
    /// `a` must be the value `apply` produced, not the pre-activation; every
    /// per-kind `df` is written in terms of it. Softmax routes through its
    /// Jacobian-vector product instead of an elementwise scale.
    pub fn backprop(&self, a: ArrayView1<f32>, upstream: ArrayView1<f32>) -> Array1<f32> {
        match self {
            ActFn::Softmax(s) => s.backprop(a, upstream),
            elementwise => {
                let mut d = upstream.to_owned();
                d.zip_mut_with(&a, |d, &a| *d *= elementwise.df(a));
                d
            }
        }
    }

    /// Elementwise derivative at the cached activation `a`.
    fn df(&self, a: f32) -> f32 {
        match self {
            ActFn::Sigmoid(f) => f.df(a),
            ActFn::Tanh(f) => f.df(a),
            ActFn::Relu(f) => f.df(a),
            ActFn::LeakyRelu(f) => f.df(a),
            ActFn::Linear(f) => f.df(a),
            // The joint backward above never reaches this arm.
            ActFn::Softmax(_) => unreachable!("softmax has no elementwise derivative"),
        }
    }
}

impl FromStr for ActFn {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sigmoid" => Ok(Self::sigmoid()),
            "tanh" => Ok(Self::tanh()),
            "relu" => Ok(Self::relu()),
            "leaky relu" | "leaky_relu" => Ok(Self::leaky_relu()),
            "linear" => Ok(Self::linear()),
            "softmax" => Ok(Self::softmax()),
            _ => Err(NetError::UnknownActivation(s.to_string())),
        }
    }
}

impl Display for ActFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActFn::Sigmoid(_) => "sigmoid",
            ActFn::Tanh(_) => "tanh",
            ActFn::Relu(_) => "relu",
            ActFn::LeakyRelu(_) => "leaky relu",
            ActFn::Linear(_) => "linear",
            ActFn::Softmax(_) => "softmax",
        };
        write!(f, "{name}")
    }
}
