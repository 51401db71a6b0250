pub use burn::{
    backend::ndarray::NdArrayDevice,
    tensor::backend::{AutodiffBackend, Backend},
};

use burn::backend::{autodiff, ndarray};

pub type Autodiff<B> = autodiff::Autodiff<B>;
pub type NdArray = ndarray::NdArray<f32>;
