//! Recurrent latent-variable generation of query images.

pub mod lstm;
pub mod network;

pub use crate::error::Error;
pub use burn::{
    config::Config,
    module::Module,
    tensor::{backend::Backend, Tensor},
};
pub use lstm::{Conv2dLstmCell, Conv2dLstmCellConfig, LstmState};
pub use network::{Generator, GeneratorConfig};

use rand::Rng;
use std::fmt;

/// Generating query images conditioned on scene representations.
pub trait GenerativeNetwork<B: Backend>: Module<B> {
    /// Generates the query images with the posterior latents inferred from them.
    ///
    /// ## Shapes
    ///
    /// * `query_images` - `[B, C, H, W]`
    /// * `query_viewpoints` - `[B, K]`
    /// * `representations` - `[B, R, R_y, R_x]`
    fn generate(
        &self,
        query_images: Tensor<B, 4>,
        query_viewpoints: Tensor<B, 2>,
        representations: Tensor<B, 4>,
    ) -> Result<GeneratorOutput<B>, Error>;

    /// Generates images of `image_size` (`[H, W]`) with the prior latents only.
    ///
    /// The latents are drawn from `rng`.
    ///
    /// ## Shapes
    ///
    /// * `query_viewpoints` - `[B, K]`
    /// * `representations` - `[B, R, R_y, R_x]`
    /// * `output` - `[B, C, H, W]`
    fn generate_sample<R: Rng + ?Sized>(
        &self,
        image_size: [usize; 2],
        query_viewpoints: Tensor<B, 2>,
        representations: Tensor<B, 4>,
        rng: &mut R,
    ) -> Result<Tensor<B, 4>, Error>;
}

#[derive(Clone)]
pub struct GeneratorOutput<B: Backend> {
    /// `[B, C, H, W]`
    pub image_mean: Tensor<B, 4>,
    /// KL divergence accumulated over all refinement steps.
    ///
    /// `[B]`
    pub kl: Tensor<B, 1>,
}

impl<B: Backend> fmt::Debug for GeneratorOutput<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("GeneratorOutput<{}>", B::name()))
            .field("image_mean.dims()", &self.image_mean.dims())
            .field("kl.dims()", &self.kl.dims())
            .finish()
    }
}
