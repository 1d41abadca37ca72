use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// The crate's error type.
///
/// Every variant except `Io`/`Serde` is a configuration or shape error:
/// those are raised before any computation runs and are never coerced into
/// a best-effort default. Numeric edge cases inside the training loop
/// (log(0), vanishing denominators) are epsilon-guarded instead and do not
/// surface here.
#[derive(Debug)]
pub enum NetError {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    EmptyTopology,
    ZeroWidthLayer {
        layer: usize,
    },
    InvalidDropout {
        layer: usize,
        rate: f32,
    },
    InvalidPenalty {
        layer: usize,
        value: f32,
    },
    UnknownActivation(String),
    UnknownLoss(String),
    UnknownOptimizer(String),
    EmptyDataset,
    RaggedDataset {
        len: usize,
        width: usize,
    },
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::SizeMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "size mismatch for {what}: got {got}, expected {expected}")
            }
            NetError::EmptyTopology => {
                write!(f, "a network needs at least one dense layer past the input")
            }
            NetError::ZeroWidthLayer { layer } => {
                write!(f, "layer {layer} has zero neurons")
            }
            NetError::InvalidDropout { layer, rate } => {
                write!(f, "dropout rate {rate} of layer {layer} is outside [0, 1)")
            }
            NetError::InvalidPenalty { layer, value } => {
                write!(f, "penalty coefficient {value} of layer {layer} is negative")
            }
            NetError::UnknownActivation(name) => {
                write!(f, "unknown activation function: {name:?}")
            }
            NetError::UnknownLoss(name) => write!(f, "unknown loss function: {name:?}"),
            NetError::UnknownOptimizer(name) => write!(f, "unknown optimizer: {name:?}"),
            NetError::EmptyDataset => write!(f, "the dataset contains no samples"),
            NetError::RaggedDataset { len, width } => {
                write!(
                    f,
                    "a flat buffer of {len} values cannot be split into rows of width {width}"
                )
            }
            NetError::Io(e) => write!(f, "io error: {e}"),
            NetError::Serde(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl Error for NetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetError::Io(e) => Some(e),
            NetError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NetError {
    fn from(e: std::io::Error) -> Self {
        NetError::Io(e)
    }
}

impl From<serde_json::Error> for NetError {
    fn from(e: serde_json::Error) -> Self {
        NetError::Serde(e)
    }
}
