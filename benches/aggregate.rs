//! ## Usage
//!
//! To run the benchmarks, execute the following command in the console:
//!
//! ```sh
//! cargo bench --bench aggregate
//! ```

use divan::Bencher;
use gqn::{
    preset::backend::NdArray,
    representation::aggregate_views,
    scene::{SceneModel, Tensor},
    GqnConfig,
};

fn main() {
    divan::main();
}

#[divan::bench(args = [1, 5, 15], sample_count = 100)]
fn aggregate_pooled_views(
    bencher: Bencher,
    view_count: usize,
) {
    bencher
        .with_inputs(data::random_views([32, 256, 1, 1], view_count))
        .bench_local_values(|views| aggregate_views(views).unwrap());
}

#[divan::bench(args = [1, 5, 15], sample_count = 20)]
fn aggregate_unpooled_views(
    bencher: Bencher,
    view_count: usize,
) {
    bencher
        .with_inputs(data::random_views([32, 256, 16, 16], view_count))
        .bench_local_values(|views| aggregate_views(views).unwrap());
}

#[divan::bench(args = [1, 5], sample_count = 10)]
fn represent(
    bencher: Bencher,
    view_count: usize,
) {
    let model: SceneModel<NdArray, _, _> = GqnConfig::new(3, 7)
        .with_r_dim(32)
        .init(&Default::default())
        .unwrap();

    bencher
        .with_inputs(data::random_context(view_count))
        .bench_local_values(|(images, viewpoints)| {
            model.represent(images, viewpoints).unwrap()
        });
}

mod data {
    use super::*;
    use burn::tensor::Distribution;

    const BATCH_SIZE: usize = 4;
    const IMAGE_SIZE: usize = 64;

    pub fn random_views(
        shape: [usize; 4],
        view_count: usize,
    ) -> impl FnMut() -> Vec<Tensor<NdArray, 4>> {
        move || {
            (0..view_count)
                .map(|_| Tensor::random(shape, Distribution::Default, &Default::default()))
                .collect()
        }
    }

    pub fn random_context(
        view_count: usize
    ) -> impl FnMut() -> (Tensor<NdArray, 5>, Tensor<NdArray, 3>) {
        move || {
            let device = Default::default();
            (
                Tensor::random(
                    [BATCH_SIZE, view_count, 3, IMAGE_SIZE, IMAGE_SIZE],
                    Distribution::Default,
                    &device,
                ),
                Tensor::random([BATCH_SIZE, view_count, 7], Distribution::Default, &device),
            )
        }
    }
}
