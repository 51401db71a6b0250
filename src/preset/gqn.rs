//! Hyper-parameters of the GQN paper setting.

/// Channels of a representation.
pub const REPRESENTATION_DIM: usize = 256;
/// Channels of the hidden states in the recurrent cores.
pub const HIDDEN_DIM: usize = 128;
/// Channels of a latent sample.
pub const LATENT_DIM: usize = 64;
/// Number of refinement steps.
pub const REFINEMENT_COUNT: usize = 12;
/// Ratio of the image size to the latent size.
pub const LATENT_SCALE: usize = 4;
/// Kernel size of the recurrent cores and the densities.
pub const CORE_KERNEL_SIZE: usize = 5;
