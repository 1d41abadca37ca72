pub mod activations;
mod builder;
mod layer;
pub mod loss;
mod network;

pub use builder::{LayerSpec, NetworkBuilder};
pub use layer::Dense;
pub use network::{Gradients, Network};
