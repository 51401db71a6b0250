//! Generative Query Networks.
//!
//! A [`SceneModel`] encodes context observations into per-view representations,
//! sums them into one scene representation, and generates query views from it.
//!
//! ## Example
//!
//! ```rust
//! use gqn::{preset::backend::NdArray, scene::Tensor, GqnConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let device = Default::default();
//! let model = GqnConfig::new(3, 7)
//!     .with_r_dim(8)
//!     .with_h_dim(4)
//!     .with_z_dim(2)
//!     .with_refinement_count(2)
//!     .init::<NdArray>(&device)?;
//!
//! // [B, M, C, H, W], [B, M, K]
//! let context_images = Tensor::zeros([2, 3, 3, 16, 16], &device);
//! let context_viewpoints = Tensor::zeros([2, 3, 7], &device);
//! // [B, K]
//! let query_viewpoints = Tensor::zeros([2, 7], &device);
//!
//! let images = model.sample(
//!     context_images,
//!     context_viewpoints,
//!     query_viewpoints,
//!     0.1,
//!     &mut StdRng::seed_from_u64(0),
//! )?;
//! assert_eq!(images.dims(), [2, 3, 16, 16]);
//! # Ok::<(), gqn::Error>(())
//! ```

pub mod error;
pub mod function;
pub mod generator;
pub mod preset;
pub mod representation;
pub mod scene;

pub use error::Error;
pub use scene::{Gqn, GqnConfig, SceneModel};
