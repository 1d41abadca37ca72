use rand::rngs::StdRng;
use rand::SeedableRng;

use super::activations::ActFn;
use super::layer::Dense;
use super::loss::Loss;
use super::network::Network;
use crate::error::Result;
use crate::optimization::OptimizerKind;

/// One dense layer entry for the builder: the output width plus the
/// settings that apply to that layer's neurons.
#[derive(Clone, Copy, Debug)]
pub struct LayerSpec {
    neurons: usize,
    activation: ActFn,
    dropout: f32,
    l1: f32,
    l2: f32,
}

impl LayerSpec {
    pub fn new(neurons: usize, activation: ActFn) -> Self {
        Self {
            neurons,
            activation,
            dropout: 0.0,
            l1: 0.0,
            l2: 0.0,
        }
    }

    pub fn dropout(mut self, rate: f32) -> Self {
        self.dropout = rate;
        self
    }

    pub fn l1(mut self, coefficient: f32) -> Self {
        self.l1 = coefficient;
        self
    }

    pub fn l2(mut self, coefficient: f32) -> Self {
        self.l2 = coefficient;
        self
    }
}

/// Assembles and validates a [`Network`].
///
/// Weight initialization draws from the builder's own seedable RNG, so a
/// built network is reproducible independently of how it is later trained.
pub struct NetworkBuilder {
    input_size: usize,
    input_dropout: f32,
    layers: Vec<LayerSpec>,
    loss: Loss,
    optimizer: OptimizerKind,
    use_bias: bool,
    seed: Option<u64>,
}

impl NetworkBuilder {
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            input_dropout: 0.0,
            layers: Vec::new(),
            loss: Loss::default(),
            optimizer: OptimizerKind::default(),
            use_bias: true,
            seed: None,
        }
    }

    /// Dropout applied to the input vector itself during training.
    pub fn input_dropout(mut self, rate: f32) -> Self {
        self.input_dropout = rate;
        self
    }

    /// Appends a dense layer.
    pub fn layer(mut self, spec: LayerSpec) -> Self {
        self.layers.push(spec);
        self
    }

    /// Appends a dense layer with no dropout or penalties.
    pub fn dense(self, neurons: usize, activation: ActFn) -> Self {
        self.layer(LayerSpec::new(neurons, activation))
    }

    pub fn loss(mut self, loss: Loss) -> Self {
        self.loss = loss;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Enables or disables bias vectors for every layer.
    pub fn bias(mut self, enabled: bool) -> Self {
        self.use_bias = enabled;
        self
    }

    /// Pins the weight-initialization RNG.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Allocates the parameter tensors and runs every configuration check.
    ///
    /// # Errors
    /// Any violated invariant: empty topology, zero-width layers, dropout
    /// outside [0, 1), negative penalties.
    pub fn build(self) -> Result<Network> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut fan_in = self.input_size;
        let layers = self
            .layers
            .iter()
            .map(|spec| {
                let layer = Dense::init(
                    fan_in,
                    spec.neurons,
                    spec.activation,
                    spec.dropout,
                    spec.l1,
                    spec.l2,
                    self.use_bias,
                    &mut rng,
                );
                fan_in = spec.neurons;
                layer
            })
            .collect();

        Network::from_parts(
            self.input_size,
            self.input_dropout,
            layers,
            self.loss,
            self.optimizer,
        )
    }
}
