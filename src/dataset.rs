use std::num::NonZeroUsize;

use ndarray::ArrayView1;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{NetError, Result};

/// An in-memory sample store.
///
/// Each row of the flat buffer is an input vector of `x_size` values followed
/// by its target vector of `y_size` values. Shuffling permutes an index
/// vector, never the buffer itself, so views stay valid across epochs.
#[derive(Clone, Debug)]
pub struct Dataset {
    x_size: usize,
    y_size: usize,
    data: Vec<f32>,
    order: Vec<usize>,
}

impl Dataset {
    /// Wraps a flat row-major buffer.
    ///
    /// # Errors
    /// `NetError::RaggedDataset` if the buffer length is not a multiple of
    /// the row width.
    pub fn new(data: Vec<f32>, x_size: usize, y_size: usize) -> Result<Self> {
        let width = x_size + y_size;
        if width == 0 || data.len() % width != 0 {
            return Err(NetError::RaggedDataset {
                len: data.len(),
                width,
            });
        }

        let len = data.len() / width;
        Ok(Self {
            x_size,
            y_size,
            data,
            order: (0..len).collect(),
        })
    }

    /// Builds a dataset from parallel input/target rows.
    ///
    /// The first row fixes the input and target widths; every following row
    /// must match them.
    ///
    /// # Errors
    /// `NetError::SizeMismatch` when the slices differ in length or a row
    /// differs in width.
    pub fn from_pairs(inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(NetError::SizeMismatch {
                what: "target rows",
                got: targets.len(),
                expected: inputs.len(),
            });
        }

        let x_size = inputs.first().map_or(0, Vec::len);
        let y_size = targets.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(inputs.len() * (x_size + y_size));

        for (x, y) in inputs.iter().zip(targets) {
            if x.len() != x_size {
                return Err(NetError::SizeMismatch {
                    what: "input row",
                    got: x.len(),
                    expected: x_size,
                });
            }
            if y.len() != y_size {
                return Err(NetError::SizeMismatch {
                    what: "target row",
                    got: y.len(),
                    expected: y_size,
                });
            }
            data.extend_from_slice(x);
            data.extend_from_slice(y);
        }

        Self::new(data, x_size, y_size)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Width of each input vector.
    pub fn x_size(&self) -> usize {
        self.x_size
    }

    /// Width of each target vector.
    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Views of the `index`-th sample's input and target, in buffer order.
    ///
    /// # Panics
    /// If `index >= len()`.
    pub fn sample(&self, index: usize) -> (ArrayView1<'_, f32>, ArrayView1<'_, f32>) {
        let width = self.x_size + self.y_size;
        let row = &self.data[index * width..(index + 1) * width];
        (
            ArrayView1::from(&row[..self.x_size]),
            ArrayView1::from(&row[self.x_size..]),
        )
    }

    /// Reshuffles the iteration order used by [`Dataset::batches`].
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
    }

    /// Splits the current order into chunks of `batch_size` sample indices.
    ///
    /// The tail batch may be short, and a batch size past the dataset length
    /// yields exactly one (short) batch.
    pub fn batches(&self, batch_size: NonZeroUsize) -> impl Iterator<Item = &[usize]> {
        self.order.chunks(batch_size.get())
    }
}
