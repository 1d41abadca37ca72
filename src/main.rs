use std::num::NonZeroUsize;

use anyhow::Result;
use feed_forward::{ActFn, Dataset, Loss, NetworkBuilder, OptimizerKind, Trainer};
use ndarray::array;

/// Trains a small network on XOR and prints what it learned.
///
/// Run with `RUST_LOG=info` to see the per-epoch progress.
fn main() -> Result<()> {
    env_logger::init();

    let xor = vec![
        0., 0., 0., //
        0., 1., 1., //
        1., 0., 1., //
        1., 1., 0., //
    ];
    let mut train = Dataset::new(xor, 2, 1)?;
    let test = train.clone();

    let mut net = NetworkBuilder::new(2)
        .dense(8, ActFn::tanh())
        .dense(1, ActFn::sigmoid())
        .loss(Loss::mse())
        .optimizer(OptimizerKind::adam())
        .seed(7)
        .build()?;

    println!("{}", net.summary());

    let history = Trainer::new(2000, 0.02)
        .batch_size(NonZeroUsize::new(4).expect("batch size is nonzero"))
        .seed(13)
        .verbose(true)
        .train(&mut net, &mut train, Some(&test))?;

    println!(
        "final loss: {:.6}, accuracy: {:.4}",
        history.test_loss().last().copied().unwrap_or(f32::NAN),
        history.accuracy().last().copied().unwrap_or(f32::NAN),
    );

    for (a, b) in [(0., 0.), (0., 1.), (1., 0.), (1., 1.)] {
        let y = net.run(array![a, b].view())?;
        println!("{a} xor {b} -> {:.3}", y[0]);
    }

    Ok(())
}
