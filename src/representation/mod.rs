//! Scene representation from context observations.

pub mod tower;

pub use crate::error::Error;
pub use burn::{
    config::Config,
    module::Module,
    tensor::{backend::Backend, Tensor},
};
pub use tower::{Tower, TowerConfig};

/// Encoding a batch of observations into representations.
pub trait RepresentationEncoder<B: Backend>: Module<B> {
    /// Encodes every observation with its viewpoint independently.
    ///
    /// ## Shapes
    ///
    /// * `images` - `[N, C, H, W]`
    /// * `viewpoints` - `[N, K]`
    /// * `output` - `[N, R, R_y, R_x]`
    fn encode(
        &self,
        images: Tensor<B, 4>,
        viewpoints: Tensor<B, 2>,
    ) -> Result<Tensor<B, 4>, Error>;
}

/// Aggregates the representations of several views into one by summation.
///
/// The result does not depend on the order of views (up to floating-point rounding),
/// and a single view is returned unchanged.
///
/// ## Shapes
///
/// * `views` - `M * [...]`
/// * `output` - `[...]`
pub fn aggregate_views<B: Backend, const D: usize>(
    views: Vec<Tensor<B, D>>
) -> Result<Tensor<B, D>, Error> {
    let mut views = views.into_iter();
    let first = views.next().ok_or_else(|| {
        Error::Validation("the count of views".into(), "positive".into())
    })?;
    let dims = first.dims();

    views.try_fold(first, |aggregate, view| {
        if view.dims() != dims {
            return Err(Error::ShapeMismatch(format!(
                "every view should be shaped {dims:?}, but got {:?}",
                view.dims()
            )));
        }
        Ok(aggregate + view)
    })
}
