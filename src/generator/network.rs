//! Generator network with refinement steps over a latent canvas.

pub use super::*;
pub use burn::nn::{
    conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
    PaddingConfig2d,
};

use crate::{
    function::{Gaussian, TensorFloatExtension},
    preset::gqn::{CORE_KERNEL_SIZE, HIDDEN_DIM, LATENT_DIM, LATENT_SCALE, REFINEMENT_COUNT},
};
use burn::tensor::activation::sigmoid;
use rand::Rng;

/// The configuration for [`Generator`].
#[derive(Config, Copy, Debug)]
pub struct GeneratorConfig {
    /// Image channels.
    pub x_dim: usize,
    /// Viewpoint dimension.
    pub v_dim: usize,
    /// Representation channels.
    pub r_dim: usize,
    /// Hidden channels of the recurrent cores.
    #[config(default = "HIDDEN_DIM")]
    pub h_dim: usize,
    /// Latent channels.
    #[config(default = "LATENT_DIM")]
    pub z_dim: usize,
    /// Number of refinement steps, `L`.
    #[config(default = "REFINEMENT_COUNT")]
    pub refinement_count: usize,
    /// Ratio of the image size to the latent size.
    #[config(default = "LATENT_SCALE")]
    pub scale: usize,
}

/// Generator network.
///
/// At every refinement step, a latent `z` is drawn from the posterior (or the prior
/// when sampling), fed to the generator core with the viewpoint and the representation,
/// and the upsampled hidden state is added to the canvas.
/// The mean image is decoded from the canvas after the last step.
///
/// ## Shapes
///
/// The latent resolution is `[H / scale, W / scale]`, noted as `[Y, X]`.
///
/// * `representations` - `[B, r_dim, 1, 1]` or `[B, r_dim, Y, X]`
#[derive(Debug, Module)]
pub struct Generator<B: Backend> {
    pub inference_core: Conv2dLstmCell<B>,
    pub generator_core: Conv2dLstmCell<B>,
    pub posterior_density: Conv2d<B>,
    pub prior_density: Conv2d<B>,
    pub observation_density: Conv2d<B>,
    pub upsample: ConvTranspose2d<B>,
    pub downsample: Conv2d<B>,
    pub x_dim: usize,
    pub v_dim: usize,
    pub r_dim: usize,
    pub h_dim: usize,
    pub refinement_count: usize,
    pub scale: usize,
}

impl GeneratorConfig {
    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Generator<B> {
        let x = self.x_dim;
        let v = self.v_dim;
        let r = self.r_dim;
        let h = self.h_dim;
        let z = self.z_dim;
        let scale = self.scale;
        let padding = CORE_KERNEL_SIZE / 2;

        let density = || {
            Conv2dConfig::new([h, 2 * z], [CORE_KERNEL_SIZE, CORE_KERNEL_SIZE])
                .with_padding(PaddingConfig2d::Explicit(padding, padding))
                .init::<B>(device)
        };

        Generator {
            inference_core: Conv2dLstmCellConfig::new(h + x + v + r, h).init(device),
            generator_core: Conv2dLstmCellConfig::new(v + r + z, h).init(device),
            posterior_density: density(),
            prior_density: density(),
            observation_density: Conv2dConfig::new([h, x], [1, 1]).init(device),
            upsample: ConvTranspose2dConfig::new([h, h], [scale, scale])
                .with_stride([scale, scale])
                .init(device),
            downsample: Conv2dConfig::new([x, x], [scale, scale])
                .with_stride([scale, scale])
                .init(device),
            x_dim: x,
            v_dim: v,
            r_dim: r,
            h_dim: h,
            refinement_count: self.refinement_count,
            scale,
        }
    }
}

impl<B: Backend> Generator<B> {
    /// Checks the conditions and tiles them over the latent resolution.
    ///
    /// ## Returns
    ///
    /// `(viewpoints, representations)`, shaped `[B, v_dim, Y, X]` and `[B, r_dim, Y, X]`.
    fn condition(
        &self,
        image_size: [usize; 2],
        viewpoints: Tensor<B, 2>,
        representations: Tensor<B, 4>,
    ) -> Result<(Tensor<B, 4>, Tensor<B, 4>), Error> {
        let [size_y, size_x] = image_size;
        let scale = self.scale;
        if size_y == 0 || size_x == 0 || size_y % scale != 0 || size_x % scale != 0 {
            return Err(Error::Generator(format!(
                "image size should be a positive multiple of {scale}, \
                but got {size_y} x {size_x}"
            )));
        }
        let latent_y = size_y / scale;
        let latent_x = size_x / scale;

        let [batch_size, viewpoint_dim] = viewpoints.dims();
        if viewpoint_dim != self.v_dim {
            return Err(Error::Generator(format!(
                "viewpoint dimension should be {}, but got {viewpoint_dim}",
                self.v_dim
            )));
        }

        let [representation_count, representation_dim, size_r_y, size_r_x] =
            representations.dims();
        if representation_count != batch_size {
            return Err(Error::Generator(format!(
                "representations should be {batch_size} as the viewpoints, \
                but got {representation_count}"
            )));
        }
        if representation_dim != self.r_dim {
            return Err(Error::Generator(format!(
                "representation channels should be {}, but got {representation_dim}",
                self.r_dim
            )));
        }

        let representations = match (size_r_y, size_r_x) {
            (1, 1) => representations.tile_spatial(latent_y, latent_x),
            (y, x) if y == latent_y && x == latent_x => representations,
            (y, x) => {
                return Err(Error::Generator(format!(
                    "representation size should be 1 x 1 or {latent_y} x {latent_x}, \
                    but got {y} x {x}"
                )))
            },
        };
        let viewpoints = viewpoints.tile_spatial(latent_y, latent_x);

        Ok((viewpoints, representations))
    }

    /// Advances the generator core by one latent sample and paints the canvas.
    fn paint(
        &self,
        latents: Tensor<B, 4>,
        viewpoints: &Tensor<B, 4>,
        representations: &Tensor<B, 4>,
        state: LstmState<B>,
        canvas: Tensor<B, 4>,
    ) -> (LstmState<B>, Tensor<B, 4>) {
        let input = Tensor::cat(
            vec![latents, viewpoints.to_owned(), representations.to_owned()],
            1,
        );
        let state = self.generator_core.forward(input, state);
        let canvas = self.upsample.forward(state.hidden.to_owned()) + canvas;
        (state, canvas)
    }

    fn prior(
        &self,
        state: &LstmState<B>,
    ) -> Gaussian<B, 4> {
        Gaussian::from_logits(self.prior_density.forward(state.hidden.to_owned()))
    }
}

impl<B: Backend> GenerativeNetwork<B> for Generator<B> {
    fn generate(
        &self,
        query_images: Tensor<B, 4>,
        query_viewpoints: Tensor<B, 2>,
        representations: Tensor<B, 4>,
    ) -> Result<GeneratorOutput<B>, Error> {
        let [batch_size, channel_count, size_y, size_x] = query_images.dims();
        if channel_count != self.x_dim {
            return Err(Error::Generator(format!(
                "image channels should be {}, but got {channel_count}",
                self.x_dim
            )));
        }
        let viewpoint_count = query_viewpoints.dims()[0];
        if viewpoint_count != batch_size {
            return Err(Error::Generator(format!(
                "query images and viewpoints should be paired, \
                but got {batch_size} images and {viewpoint_count} viewpoints"
            )));
        }

        let (viewpoints, representations) =
            self.condition([size_y, size_x], query_viewpoints, representations)?;

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gqn::generator",
            "Generator::generate > {batch_size} queries in {} steps",
            self.refinement_count,
        );

        let device = query_images.device();
        let images = self.downsample.forward(query_images);
        let latent_shape = [batch_size, self.h_dim, size_y / self.scale, size_x / self.scale];

        let mut state_generator = LstmState::zeros(latent_shape, &device);
        let mut state_inference = LstmState::zeros(latent_shape, &device);
        let mut canvas = Tensor::<B, 4>::zeros([batch_size, self.h_dim, size_y, size_x], &device);
        let mut kl = Tensor::<B, 1>::zeros([batch_size], &device);

        for _ in 0..self.refinement_count {
            let prior = self.prior(&state_generator);

            let input = Tensor::cat(
                vec![
                    state_generator.hidden.to_owned(),
                    images.to_owned(),
                    viewpoints.to_owned(),
                    representations.to_owned(),
                ],
                1,
            );
            state_inference = self.inference_core.forward(input, state_inference);
            let posterior = Gaussian::from_logits(
                self.posterior_density
                    .forward(state_inference.hidden.to_owned()),
            );

            kl = kl + posterior
                .kl_divergence(&prior)
                .flatten::<2>(1, 3)
                .sum_dim(1)
                .squeeze::<1>(1);

            (state_generator, canvas) = self.paint(
                posterior.rsample(),
                &viewpoints,
                &representations,
                state_generator,
                canvas,
            );
        }

        let image_mean = sigmoid(self.observation_density.forward(canvas));

        Ok(GeneratorOutput { image_mean, kl })
    }

    fn generate_sample<R: Rng + ?Sized>(
        &self,
        image_size: [usize; 2],
        query_viewpoints: Tensor<B, 2>,
        representations: Tensor<B, 4>,
        rng: &mut R,
    ) -> Result<Tensor<B, 4>, Error> {
        let [size_y, size_x] = image_size;
        let (viewpoints, representations) =
            self.condition(image_size, query_viewpoints, representations)?;
        let batch_size = viewpoints.dims()[0];

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gqn::generator",
            "Generator::generate_sample > {batch_size} queries in {} steps",
            self.refinement_count,
        );

        let device = viewpoints.device();
        let latent_shape = [batch_size, self.h_dim, size_y / self.scale, size_x / self.scale];

        let mut state_generator = LstmState::zeros(latent_shape, &device);
        let mut canvas = Tensor::<B, 4>::zeros([batch_size, self.h_dim, size_y, size_x], &device);

        for _ in 0..self.refinement_count {
            let latents = self.prior(&state_generator).sample_with(rng);
            (state_generator, canvas) = self.paint(
                latents,
                &viewpoints,
                &representations,
                state_generator,
                canvas,
            );
        }

        Ok(sigmoid(self.observation_density.forward(canvas)))
    }
}
