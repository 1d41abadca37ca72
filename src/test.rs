#![cfg(test)]

use std::num::NonZeroUsize;

use ndarray::{Array2, array};

use crate::arch::activations::ActFn;
use crate::arch::loss::Loss;
use crate::arch::{LayerSpec, NetworkBuilder};
use crate::dataset::Dataset;
use crate::error::NetError;
use crate::optimization::OptimizerKind;
use crate::training::Trainer;

fn batch(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

/// Two well-separated point clouds, linearly separable.
fn separable_dataset() -> Dataset {
    let rows = vec![
        0.0, 0.1, 0.0, //
        0.1, 0.0, 0.0, //
        0.2, 0.1, 0.0, //
        0.1, 0.2, 0.0, //
        0.9, 1.0, 1.0, //
        1.0, 0.9, 1.0, //
        0.8, 0.9, 1.0, //
        1.0, 1.0, 1.0, //
    ];
    Dataset::new(rows, 2, 1).unwrap()
}

fn xor_dataset() -> Dataset {
    let rows = vec![
        0., 0., 0., //
        0., 1., 1., //
        1., 0., 1., //
        1., 1., 0., //
    ];
    Dataset::new(rows, 2, 1).unwrap()
}

#[test]
fn single_layer_momentum_reaches_low_loss() {
    let mut train = separable_dataset();
    let mut net = NetworkBuilder::new(2)
        .dense(1, ActFn::sigmoid())
        .loss(Loss::mse())
        .optimizer(OptimizerKind::momentum(0.6))
        .seed(1)
        .build()
        .unwrap();

    let history = Trainer::new(2000, 0.5)
        .batch_size(batch(4))
        .seed(2)
        .train(&mut net, &mut train, None)
        .unwrap();

    let final_loss = *history.train_loss().last().unwrap();
    assert!(final_loss < 0.05, "final loss {final_loss}");
}

#[test]
fn xor_converges_with_adam() {
    let mut train = xor_dataset();
    let mut net = NetworkBuilder::new(2)
        .dense(8, ActFn::tanh())
        .dense(1, ActFn::sigmoid())
        .loss(Loss::mse())
        .optimizer(OptimizerKind::adam())
        .seed(4)
        .build()
        .unwrap();

    let history = Trainer::new(3000, 0.02)
        .batch_size(batch(4))
        .seed(5)
        .train(&mut net, &mut train, None)
        .unwrap();

    let final_loss = *history.train_loss().last().unwrap();
    assert!(final_loss < 0.05, "final loss {final_loss}");

    for (a, b, want) in [(0., 0., 0.), (0., 1., 1.), (1., 0., 1.), (1., 1., 0.)] {
        let y = net.run(array![a, b].view()).unwrap();
        assert!(
            (y[0] - want).abs() < 0.3,
            "{a} xor {b}: got {} want {want}",
            y[0]
        );
    }
}

#[test]
fn three_way_softmax_classification() {
    // Three clusters in the plane, one-hot targets.
    let inputs = [
        [0.0, 0.0],
        [0.1, 0.0],
        [0.0, 0.1],
        [0.1, 0.1],
        [1.0, 0.0],
        [0.9, 0.0],
        [1.0, 0.1],
        [0.9, 0.1],
        [0.0, 1.0],
        [0.1, 1.0],
        [0.0, 0.9],
        [0.1, 0.9],
    ];
    let mut rows = Vec::new();
    for (i, [a, b]) in inputs.iter().enumerate() {
        rows.extend_from_slice(&[*a, *b]);
        let class = i / 4;
        for c in 0..3 {
            rows.push(if c == class { 1.0 } else { 0.0 });
        }
    }
    let mut train = Dataset::new(rows, 2, 3).unwrap();
    let test = train.clone();

    let mut net = NetworkBuilder::new(2)
        .dense(8, ActFn::tanh())
        .dense(3, ActFn::softmax())
        .loss(Loss::cross_entropy())
        .optimizer(OptimizerKind::adam())
        .seed(6)
        .build()
        .unwrap();

    let history = Trainer::new(1500, 0.02)
        .batch_size(batch(4))
        .seed(7)
        .train(&mut net, &mut train, Some(&test))
        .unwrap();

    let accuracy = *history.accuracy().last().unwrap();
    assert!(accuracy >= 0.9, "accuracy {accuracy}");

    // The output layer stays a probability distribution after training.
    let y = net.run(array![0.05, 0.05].view()).unwrap();
    assert!((y.sum() - 1.0).abs() < 1e-5);
}

#[test]
fn inference_ignores_dropout_and_is_deterministic() {
    let net = NetworkBuilder::new(2)
        .input_dropout(0.2)
        .layer(LayerSpec::new(6, ActFn::sigmoid()).dropout(0.5))
        .dense(1, ActFn::sigmoid())
        .seed(8)
        .build()
        .unwrap();

    let x = array![0.4, 0.6];
    let first = net.run(x.view()).unwrap();
    for _ in 0..10 {
        assert_eq!(net.run(x.view()).unwrap(), first);
    }
}

#[test]
fn batch_inference_matches_single_sample_runs() {
    let net = NetworkBuilder::new(3)
        .dense(5, ActFn::tanh())
        .dense(2, ActFn::sigmoid())
        .seed(9)
        .build()
        .unwrap();

    let xs = Array2::from_shape_vec(
        (4, 3),
        vec![0.1, 0.2, 0.3, -0.5, 0.0, 0.5, 1.0, 1.0, 1.0, -1.0, 0.25, 0.75],
    )
    .unwrap();

    let batched = net.run_batch(xs.view()).unwrap();
    assert_eq!(batched.dim(), (4, 2));

    for (row, x) in xs.rows().into_iter().enumerate() {
        let single = net.run(x).unwrap();
        for col in 0..single.len() {
            assert!((batched[[row, col]] - single[col]).abs() < 1e-6);
        }
    }
}

#[test]
fn oversized_batch_still_trains_every_epoch() {
    let mut train = xor_dataset();
    let mut net = NetworkBuilder::new(2)
        .dense(4, ActFn::sigmoid())
        .dense(1, ActFn::sigmoid())
        .seed(10)
        .build()
        .unwrap();

    let history = Trainer::new(3, 0.1)
        .batch_size(batch(128))
        .seed(11)
        .train(&mut net, &mut train, None)
        .unwrap();

    assert_eq!(history.epochs(), 3);
    assert!(history.train_loss().iter().all(|l| l.is_finite()));
}

#[test]
fn seeded_training_is_reproducible_with_dropout() {
    let build = || {
        NetworkBuilder::new(2)
            .layer(LayerSpec::new(6, ActFn::tanh()).dropout(0.3))
            .dense(1, ActFn::sigmoid())
            .seed(12)
            .build()
            .unwrap()
    };

    let run = || {
        let mut train = xor_dataset();
        let mut net = build();
        Trainer::new(50, 0.1)
            .batch_size(batch(2))
            .seed(13)
            .train(&mut net, &mut train, None)
            .unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a.train_loss(), b.train_loss());
}

#[test]
fn missing_test_set_skips_evaluation() {
    let mut train = xor_dataset();
    let mut net = NetworkBuilder::new(2)
        .dense(3, ActFn::sigmoid())
        .dense(1, ActFn::sigmoid())
        .seed(14)
        .build()
        .unwrap();

    let history = Trainer::new(5, 0.1)
        .seed(15)
        .train(&mut net, &mut train, None)
        .unwrap();

    assert_eq!(history.epochs(), 5);
    assert!(history.test_loss().is_empty());
    assert!(history.accuracy().is_empty());
}

#[test]
fn mismatched_dataset_widths_are_fatal_before_training() {
    let mut train = xor_dataset();
    let mut net = NetworkBuilder::new(3)
        .dense(1, ActFn::sigmoid())
        .seed(16)
        .build()
        .unwrap();

    let res = Trainer::new(5, 0.1).train(&mut net, &mut train, None);
    assert!(matches!(res, Err(NetError::SizeMismatch { .. })));
}

#[test]
fn l2_penalty_shrinks_learned_weights() {
    let weight_norm = |l2: f32| {
        let mut train = separable_dataset();
        let mut net = NetworkBuilder::new(2)
            .layer(LayerSpec::new(4, ActFn::tanh()).l2(l2))
            .layer(LayerSpec::new(1, ActFn::sigmoid()).l2(l2))
            .seed(17)
            .build()
            .unwrap();

        Trainer::new(500, 0.5)
            .batch_size(batch(4))
            .seed(18)
            .train(&mut net, &mut train, None)
            .unwrap();

        net.layers()
            .iter()
            .map(|l| l.weights().iter().map(|w| w * w).sum::<f32>())
            .sum::<f32>()
    };

    let plain = weight_norm(0.0);
    let regularized = weight_norm(0.1);
    assert!(
        regularized < plain,
        "l2 {regularized} should be below {plain}"
    );
}

#[test]
fn dropout_training_still_learns() {
    let mut train = separable_dataset();
    let test = train.clone();
    let mut net = NetworkBuilder::new(2)
        .layer(LayerSpec::new(6, ActFn::tanh()).dropout(0.2))
        .dense(1, ActFn::sigmoid())
        .seed(19)
        .build()
        .unwrap();

    let history = Trainer::new(800, 0.2)
        .batch_size(batch(4))
        .seed(20)
        .train(&mut net, &mut train, Some(&test))
        .unwrap();

    let first = history.test_loss()[0];
    let last = *history.test_loss().last().unwrap();
    assert!(last < first, "loss went from {first} to {last}");
    assert!(last < 0.1, "final test loss {last}");
}
