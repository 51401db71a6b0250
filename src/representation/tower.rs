//! Tower representation network.

pub use super::*;
pub use burn::nn::{
    conv::{Conv2d, Conv2dConfig},
    pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
    PaddingConfig2d,
};

use crate::{function::TensorFloatExtension, preset::gqn::REPRESENTATION_DIM};
use burn::tensor::activation::relu;

/// The configuration for [`Tower`].
#[derive(Config, Copy, Debug)]
pub struct TowerConfig {
    /// Image channels.
    pub x_dim: usize,
    /// Viewpoint dimension.
    pub v_dim: usize,
    /// Representation channels.
    #[config(default = "REPRESENTATION_DIM")]
    pub r_dim: usize,
    /// Average over the spatial dimensions of the representation.
    #[config(default = true)]
    pub pool: bool,
}

/// Tower representation network.
///
/// The image is reduced by 4 in each spatial dimension through strided convolutions,
/// then the viewpoint is tiled over the feature map and mixed in by
/// residual convolutions.
///
/// ## Shapes
///
/// * `images` - `[N, x_dim, H, W]`
/// * `viewpoints` - `[N, v_dim]`
/// * `output` - `[N, r_dim, 1, 1]` if pooled, `[N, r_dim, H / 4, W / 4]` otherwise
#[derive(Debug, Module)]
pub struct Tower<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub conv3: Conv2d<B>,
    pub conv4: Conv2d<B>,
    pub conv5: Conv2d<B>,
    pub conv6: Conv2d<B>,
    pub conv7: Conv2d<B>,
    pub conv8: Conv2d<B>,
    pub pool: Option<AdaptiveAvgPool2d>,
    pub x_dim: usize,
    pub v_dim: usize,
}

impl TowerConfig {
    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Tower<B> {
        let x = self.x_dim;
        let v = self.v_dim;
        let r = self.r_dim;
        let r_half = (r / 2).max(1);

        let strided = |channels: [usize; 2]| {
            Conv2dConfig::new(channels, [2, 2])
                .with_stride([2, 2])
                .init::<B>(device)
        };
        let padded = |channels: [usize; 2]| {
            Conv2dConfig::new(channels, [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init::<B>(device)
        };

        Tower {
            conv1: strided([x, r]),
            conv2: strided([r, r]),
            conv3: padded([r, r_half]),
            conv4: strided([r_half, r]),
            conv5: padded([r + v, r]),
            conv6: padded([r + v, r_half]),
            conv7: padded([r_half, r]),
            conv8: Conv2dConfig::new([r, r], [1, 1]).init(device),
            pool: self
                .pool
                .then(|| AdaptiveAvgPool2dConfig::new([1, 1]).init()),
            x_dim: x,
            v_dim: v,
        }
    }
}

impl<B: Backend> Tower<B> {
    /// Applies the forward pass without checking the shapes.
    pub fn forward(
        &self,
        images: Tensor<B, 4>,
        viewpoints: Tensor<B, 2>,
    ) -> Tensor<B, 4> {
        let skip_in = relu(self.conv1.forward(images));
        let skip_out = relu(self.conv2.forward(skip_in.to_owned()));
        let r = relu(self.conv3.forward(skip_in));
        let r = relu(self.conv4.forward(r)) + skip_out;

        let [_, _, size_y, size_x] = r.dims();
        let viewpoints = viewpoints.tile_spatial(size_y, size_x);

        let skip_in = Tensor::cat(vec![r, viewpoints], 1);
        let skip_out = relu(self.conv5.forward(skip_in.to_owned()));
        let r = relu(self.conv6.forward(skip_in));
        let r = relu(self.conv7.forward(r)) + skip_out;
        let r = relu(self.conv8.forward(r));

        match &self.pool {
            Some(pool) => pool.forward(r),
            None => r,
        }
    }
}

impl<B: Backend> RepresentationEncoder<B> for Tower<B> {
    fn encode(
        &self,
        images: Tensor<B, 4>,
        viewpoints: Tensor<B, 2>,
    ) -> Result<Tensor<B, 4>, Error> {
        let [image_count, channel_count, size_y, size_x] = images.dims();
        let [viewpoint_count, viewpoint_dim] = viewpoints.dims();

        if channel_count != self.x_dim {
            return Err(Error::Encoder(format!(
                "image channels should be {}, but got {channel_count}",
                self.x_dim
            )));
        }
        if viewpoint_dim != self.v_dim {
            return Err(Error::Encoder(format!(
                "viewpoint dimension should be {}, but got {viewpoint_dim}",
                self.v_dim
            )));
        }
        if image_count != viewpoint_count {
            return Err(Error::Encoder(format!(
                "images and viewpoints should be paired, \
                but got {image_count} images and {viewpoint_count} viewpoints"
            )));
        }
        if size_y == 0 || size_x == 0 || size_y % 4 != 0 || size_x % 4 != 0 {
            return Err(Error::Encoder(format!(
                "image size should be a positive multiple of 4, \
                but got {size_y} x {size_x}"
            )));
        }

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gqn::representation",
            "Tower::encode > {image_count} images of {size_y} x {size_x}",
        );

        Ok(self.forward(images, viewpoints))
    }
}
