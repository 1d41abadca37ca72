pub mod arch;
pub mod dataset;
pub mod error;
pub mod optimization;
pub mod snapshot;
mod test;
pub mod training;

pub use arch::activations::ActFn;
pub use arch::loss::Loss;
pub use arch::{LayerSpec, Network, NetworkBuilder};
pub use dataset::Dataset;
pub use error::{NetError, Result};
pub use optimization::OptimizerKind;
pub use snapshot::Snapshot;
pub use training::{History, Trainer};
