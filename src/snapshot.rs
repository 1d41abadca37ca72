use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::arch::loss::Loss;
use crate::arch::{Dense, Network};
use crate::error::Result;
use crate::optimization::OptimizerKind;

/// Every persistent value a trained network consists of: the input width,
/// the dense layers (weight and bias tensors plus each layer's activation
/// label and dropout/penalty settings), and the loss/optimizer selections.
///
/// Optimizer accumulators are deliberately absent: they live exactly as long
/// as one training session and are re-zeroed by the next `train` call.
///
/// The helpers below write plain serde JSON, but consumers are free to
/// re-encode the struct however they like.
#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    pub input_size: usize,
    pub input_dropout: f32,
    pub layers: Vec<Dense>,
    pub loss: Loss,
    pub optimizer: OptimizerKind,
}

impl Snapshot {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl Network {
    /// Clones the persistent state out of the network.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            input_size: self.input_size(),
            input_dropout: self.input_dropout(),
            layers: self.layers().to_vec(),
            loss: self.loss(),
            optimizer: self.optimizer(),
        }
    }

    /// Rebuilds a network from a snapshot, re-checking every shape
    /// invariant so a hand-edited file cannot produce a broken model.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        Network::from_parts(
            snapshot.input_size,
            snapshot.input_dropout,
            snapshot.layers,
            snapshot.loss,
            snapshot.optimizer,
        )
    }
}
