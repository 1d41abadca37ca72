mod adagrad;
mod adam;
mod momentum;
mod optimizer;
mod rmsprop;

pub use adagrad::Adagrad;
pub use adam::Adam;
pub use momentum::Momentum;
pub use optimizer::{Optimizer, OptimizerKind};
pub use rmsprop::RmsProp;
