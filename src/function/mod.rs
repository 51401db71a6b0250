pub mod gaussian;
pub mod tensor_extensions;

pub use gaussian::Gaussian;
pub use tensor_extensions::TensorFloatExtension;
