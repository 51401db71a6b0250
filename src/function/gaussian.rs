//! Diagonal Gaussian density.

pub use burn::tensor::{backend::Backend, Distribution, Tensor, TensorData};

use burn::tensor::activation;
use rand::Rng;
use rand_distr::{Distribution as _, StandardNormal};

/// The lower bound of a standard deviation made by [`Gaussian::from_logits`].
pub const STD_MIN: f32 = 1e-6;

/// Diagonal Gaussian (Normal) density over every element of a tensor.
#[derive(Clone, Debug)]
pub struct Gaussian<B: Backend, const D: usize> {
    /// Mean.
    pub mean: Tensor<B, D>,
    /// Standard deviation.
    ///
    /// It should be positive.
    pub std: Tensor<B, D>,
}

impl<B: Backend, const D: usize> Gaussian<B, D> {
    #[inline]
    pub fn new(
        mean: Tensor<B, D>,
        std: Tensor<B, D>,
    ) -> Self {
        Self { mean, std }
    }

    /// Splits the channels of the logits in halves.
    ///
    /// The first half is the mean and the second half passes through softplus
    /// to be the standard deviation.
    ///
    /// ## Shapes
    ///
    /// * `logits` - `[N, 2 * Z, ...]`
    /// * `mean`, `std` - `[N, Z, ...]`
    pub fn from_logits(logits: Tensor<B, D>) -> Self {
        let channel_count = logits.dims()[1];
        debug_assert_eq!(channel_count % 2, 0, "channel_count should be even");

        let half = channel_count / 2;
        let mean = logits.to_owned().narrow(1, 0, half);
        let std = softplus(logits.narrow(1, half, half)).clamp_min(STD_MIN);
        Self { mean, std }
    }

    /// Reparameterized sample, `mean + std * ε` with `ε ~ N(0, 1)`.
    ///
    /// It is differentiable with respect to both the mean and the standard deviation.
    pub fn rsample(&self) -> Tensor<B, D> {
        let noise = self
            .mean
            .random_like(Distribution::Normal(0.0, 1.0))
            .detach();
        self.mean.to_owned() + self.std.to_owned() * noise
    }

    /// Sample without gradients.
    #[inline]
    pub fn sample(&self) -> Tensor<B, D> {
        self.rsample().detach()
    }

    /// Sample without gradients, drawing the noise from `rng`.
    ///
    /// The same `rng` state gives the same sample on any backend.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Tensor<B, D> {
        let dims = self.mean.dims();
        let noise = StandardNormal
            .sample_iter(rng)
            .take(dims.iter().product())
            .collect::<Vec<f32>>();
        let noise = Tensor::from_data(
            TensorData::new(noise, dims).convert::<B::FloatElem>(),
            &self.mean.device(),
        );

        (self.mean.to_owned() + self.std.to_owned() * noise).detach()
    }

    /// Element-wise `KL(self || prior)` in closed form.
    pub fn kl_divergence(
        &self,
        prior: &Self,
    ) -> Tensor<B, D> {
        let variance_ratio = (self.std.to_owned() / prior.std.to_owned()).powf_scalar(2.0);
        let mean_term = ((self.mean.to_owned() - prior.mean.to_owned())
            / prior.std.to_owned())
        .powf_scalar(2.0);

        (variance_ratio.to_owned() + mean_term - variance_ratio.log())
            .sub_scalar(1.0)
            .mul_scalar(0.5)
    }
}

/// `ln(1 + exp(input))`, computed as `max(input, 0) + ln(1 + exp(-|input|))`.
pub fn softplus<B: Backend, const D: usize>(input: Tensor<B, D>) -> Tensor<B, D> {
    activation::relu(input.to_owned()) + input.abs().neg().exp().log1p()
}
