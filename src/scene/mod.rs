//! Scene model composing the representation and the generation of query views.

pub mod config;
pub mod describe;
pub mod listener;

pub use crate::{
    error::Error,
    generator::{GenerativeNetwork, Generator, GeneratorOutput},
    representation::{aggregate_views, RepresentationEncoder, Tower},
};
pub use burn::{
    module::Module,
    tensor::{backend::Backend, Tensor, TensorData},
};
pub use config::*;
pub use describe::*;
pub use listener::*;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::fmt;

/// Generative Query Network built from [`Tower`] and [`Generator`].
pub type Gqn<B> = SceneModel<B, Tower<B>, Generator<B>>;

/// Scene model.
///
/// The representations of the context views are aggregated into one scene
/// representation, which conditions the generation of the query views.
/// No state is kept across calls other than the parameters and the listeners.
///
/// ## Shapes
///
/// * `context_images` - `[B, M, C, H, W]`
/// * `context_viewpoints` - `[B, M, K]`
/// * `query_images` - `[B, C, H, W]`
/// * `query_viewpoints` - `[B, K]`
pub struct SceneModel<B: Backend, E, G> {
    /// Encoder of every context view.
    pub encoder: E,
    /// Generator of query views.
    pub generator: G,
    listeners: ListenerRegistry<B>,
}

#[derive(Clone)]
pub struct InferOutput<B: Backend> {
    /// `[B, C, H, W]`
    pub image_mean: Tensor<B, 4>,
    /// `[B, R, R_y, R_x]`
    pub representation: Tensor<B, 4>,
    /// `[B]`
    pub kl: Tensor<B, 1>,
    /// Outputs of the listeners in registration order.
    pub listeners: Vec<ListenerOutput<B>>,
}

impl<B: Backend, E, G> SceneModel<B, E, G> {
    #[inline]
    pub fn new(
        encoder: E,
        generator: G,
    ) -> Self {
        Self {
            encoder,
            generator,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Appends a listener which runs at every [`SceneModel::infer`].
    ///
    /// The same name can be registered more than once.
    pub fn add_listener(
        &mut self,
        model: impl Listener<B>,
        name: impl Into<String>,
    ) {
        self.listeners.register(Box::new(model), name.into());
    }

    #[inline]
    pub fn listeners(&self) -> &ListenerRegistry<B> {
        &self.listeners
    }
}

impl<B: Backend, E: RepresentationEncoder<B>, G: GenerativeNetwork<B>>
    SceneModel<B, E, G>
{
    /// Aggregated scene representations from the context views.
    ///
    /// ## Shapes
    ///
    /// * `output` - `[B, R, R_y, R_x]`
    pub fn represent(
        &self,
        context_images: Tensor<B, 5>,
        context_viewpoints: Tensor<B, 3>,
    ) -> Result<Tensor<B, 4>, Error> {
        let [batch_size, view_count, channel_count, size_y, size_x] =
            context_images.dims();
        let [batch_size_v, view_count_v, viewpoint_dim] = context_viewpoints.dims();

        if batch_size != batch_size_v || view_count != view_count_v {
            return Err(Error::ShapeMismatch(format!(
                "context images and viewpoints should share the batch and view axes, \
                but got [{batch_size}, {view_count}, ..] and [{batch_size_v}, {view_count_v}, ..]"
            )));
        }
        if batch_size == 0 {
            return Err(Error::Validation(
                "the count of scenes".into(),
                "positive".into(),
            ));
        }
        if view_count == 0 {
            return Err(Error::Validation(
                "the count of context views".into(),
                "positive".into(),
            ));
        }

        // B * M
        let count = batch_size * view_count;

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gqn::scene",
            "SceneModel::represent > encode {view_count} views of {batch_size} scenes",
        );

        // [B * M, C, H, W]
        let images = context_images.reshape([count, channel_count, size_y, size_x]);
        // [B * M, K]
        let viewpoints = context_viewpoints.reshape([count, viewpoint_dim]);
        // [B * M, R, R_y, R_x]
        let representations = self.encoder.encode(images, viewpoints)?;

        let [representation_count, r_dim, size_r_y, size_r_x] = representations.dims();
        if representation_count != count {
            return Err(Error::ShapeMismatch(format!(
                "the encoder should output {count} representations, \
                but got {representation_count}"
            )));
        }

        // M * [B, R, R_y, R_x]
        let views = representations
            .reshape([batch_size, view_count, r_dim, size_r_y, size_r_x])
            .iter_dim(1)
            .map(|view| view.squeeze::<4>(1))
            .collect();

        #[cfg(debug_assertions)]
        log::debug!(target: "gqn::scene", "SceneModel::represent > aggregate");

        aggregate_views(views)
    }

    /// Reconstructs the query views for training.
    ///
    /// The listeners run after the generation in registration order,
    /// and a failing listener fails the whole call.
    pub fn infer(
        &self,
        context_images: Tensor<B, 5>,
        context_viewpoints: Tensor<B, 3>,
        query_images: Tensor<B, 4>,
        query_viewpoints: Tensor<B, 2>,
    ) -> Result<InferOutput<B>, Error> {
        let batch_size = context_images.dims()[0];
        let query_image_count = query_images.dims()[0];
        if query_image_count != batch_size {
            return Err(Error::ShapeMismatch(format!(
                "query images should be {batch_size} as the scenes, \
                but got {query_image_count}"
            )));
        }
        Self::check_query_viewpoints(&context_viewpoints, &query_viewpoints)?;

        let representation = self.represent(context_images, context_viewpoints)?;

        #[cfg(debug_assertions)]
        log::debug!(target: "gqn::scene", "SceneModel::infer > generate");

        let GeneratorOutput { image_mean, kl } = self.generator.generate(
            query_images.to_owned(),
            query_viewpoints.to_owned(),
            representation.to_owned(),
        )?;

        let listeners = self.listeners.dispatch(&ListenerInput {
            image: query_images,
            viewpoint: query_viewpoints,
            representation: representation.to_owned(),
        })?;

        Ok(InferOutput {
            image_mean,
            representation,
            kl,
            listeners,
        })
    }

    /// Samples the query views with pixel noise of standard deviation `sigma`.
    ///
    /// The latents and the pixel noise are both drawn from `rng`, so the same
    /// `rng` state reproduces the same sample.
    ///
    /// ## Shapes
    ///
    /// * `output` - `[B, C, H, W]`, where `[H, W]` follows the context images.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        context_images: Tensor<B, 5>,
        context_viewpoints: Tensor<B, 3>,
        query_viewpoints: Tensor<B, 2>,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Tensor<B, 4>, Error> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(Error::InvalidSigma(sigma));
        }
        let pixel_noise =
            Normal::new(0.0, sigma).map_err(|_| Error::InvalidSigma(sigma))?;

        let [_, _, _, size_y, size_x] = context_images.dims();
        Self::check_query_viewpoints(&context_viewpoints, &query_viewpoints)?;

        let representation = self.represent(context_images, context_viewpoints)?;

        #[cfg(debug_assertions)]
        log::debug!(target: "gqn::scene", "SceneModel::sample > generate");

        let image_mean = self.generator.generate_sample(
            [size_y, size_x],
            query_viewpoints,
            representation,
            rng,
        )?;

        let dims = image_mean.dims();
        let noise = pixel_noise
            .sample_iter(rng)
            .take(dims.iter().product())
            .map(|value| value as f32)
            .collect::<Vec<_>>();
        let noise = Tensor::from_data(
            TensorData::new(noise, dims).convert::<B::FloatElem>(),
            &image_mean.device(),
        );

        Ok(image_mean + noise)
    }

    fn check_query_viewpoints(
        context_viewpoints: &Tensor<B, 3>,
        query_viewpoints: &Tensor<B, 2>,
    ) -> Result<(), Error> {
        let [batch_size, _, viewpoint_dim] = context_viewpoints.dims();
        let [batch_size_q, viewpoint_dim_q] = query_viewpoints.dims();

        if batch_size != batch_size_q || viewpoint_dim != viewpoint_dim_q {
            return Err(Error::ShapeMismatch(format!(
                "query viewpoints should be [{batch_size}, {viewpoint_dim}], \
                but got [{batch_size_q}, {viewpoint_dim_q}]"
            )));
        }

        Ok(())
    }
}

impl<B: Backend, E: fmt::Debug, G: fmt::Debug> fmt::Debug for SceneModel<B, E, G> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("SceneModel<{}>", B::name()))
            .field("encoder", &self.encoder)
            .field("generator", &self.generator)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<B: Backend> fmt::Debug for InferOutput<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("InferOutput<{}>", B::name()))
            .field("image_mean.dims()", &self.image_mean.dims())
            .field("representation.dims()", &self.representation.dims())
            .field("kl.dims()", &self.kl.dims())
            .field("listeners", &self.listeners)
            .finish()
    }
}
