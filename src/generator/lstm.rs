//! Convolutional LSTM.

pub use super::*;
pub use burn::nn::{
    conv::{Conv2d, Conv2dConfig},
    PaddingConfig2d,
};

use crate::preset::gqn::CORE_KERNEL_SIZE;
use burn::tensor::activation::{sigmoid, tanh};

/// The configuration for [`Conv2dLstmCell`].
#[derive(Config, Copy, Debug)]
pub struct Conv2dLstmCellConfig {
    /// Input channels.
    pub dim_input: usize,
    /// Hidden channels.
    pub dim_hidden: usize,
    /// It should be odd to keep the spatial size.
    #[config(default = "CORE_KERNEL_SIZE")]
    pub kernel_size: usize,
}

/// LSTM cell whose gates are convolutions over `[hidden, input]`.
///
/// ## Shapes
///
/// * `input` - `[N, dim_input, Y, X]`
/// * `hidden`, `cell` - `[N, dim_hidden, Y, X]`
#[derive(Debug, Module)]
pub struct Conv2dLstmCell<B: Backend> {
    pub forget: Conv2d<B>,
    pub input: Conv2d<B>,
    pub output: Conv2d<B>,
    pub state: Conv2d<B>,
}

/// Recurrent state of [`Conv2dLstmCell`].
#[derive(Clone, Debug)]
pub struct LstmState<B: Backend> {
    pub hidden: Tensor<B, 4>,
    pub cell: Tensor<B, 4>,
}

impl Conv2dLstmCellConfig {
    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Conv2dLstmCell<B> {
        let channels = [self.dim_input + self.dim_hidden, self.dim_hidden];
        let kernel_size = self.kernel_size;
        let padding = kernel_size / 2;
        let gate = || {
            Conv2dConfig::new(channels, [kernel_size, kernel_size])
                .with_padding(PaddingConfig2d::Explicit(padding, padding))
                .init::<B>(device)
        };

        Conv2dLstmCell {
            forget: gate(),
            input: gate(),
            output: gate(),
            state: gate(),
        }
    }
}

impl<B: Backend> Conv2dLstmCell<B> {
    /// Applies one recurrent step.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
        state: LstmState<B>,
    ) -> LstmState<B> {
        let input = Tensor::cat(vec![state.hidden, input], 1);

        let forget_gate = sigmoid(self.forget.forward(input.to_owned()));
        let input_gate = sigmoid(self.input.forward(input.to_owned()));
        let output_gate = sigmoid(self.output.forward(input.to_owned()));
        let state_gate = tanh(self.state.forward(input));

        let cell = forget_gate * state.cell + input_gate * state_gate;
        let hidden = output_gate * tanh(cell.to_owned());

        LstmState { hidden, cell }
    }
}

impl<B: Backend> LstmState<B> {
    /// Zero state of the given shape.
    pub fn zeros(
        shape: [usize; 4],
        device: &B::Device,
    ) -> Self {
        Self {
            hidden: Tensor::zeros(shape, device),
            cell: Tensor::zeros(shape, device),
        }
    }
}
