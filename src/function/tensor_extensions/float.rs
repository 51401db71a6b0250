use burn::tensor::{backend, Float, Tensor};

pub trait TensorFloatExtension<B: backend::Backend> {
    /// Repeats every feature over a `height` by `width` grid.
    ///
    /// ## Shapes
    ///
    /// * `self` - `[N, K]` or `[N, K, 1, 1]`
    /// * `output` - `[N, K, height, width]`
    fn tile_spatial(
        self,
        height: usize,
        width: usize,
    ) -> Tensor<B, 4, Float>;
}

impl<B: backend::Backend> TensorFloatExtension<B> for Tensor<B, 2, Float> {
    fn tile_spatial(
        self,
        height: usize,
        width: usize,
    ) -> Tensor<B, 4, Float> {
        let [count, dim] = self.dims();
        self.reshape([count, dim, 1, 1]).tile_spatial(height, width)
    }
}

impl<B: backend::Backend> TensorFloatExtension<B> for Tensor<B, 4, Float> {
    fn tile_spatial(
        self,
        height: usize,
        width: usize,
    ) -> Tensor<B, 4, Float> {
        let [count, dim, size_y, size_x] = self.dims();
        assert!(
            size_y == 1 && size_x == 1,
            "The spatial dimensions to tile should be ones, \
            but got self.dims() = {:?}",
            self.dims()
        );

        Tensor::ones([count, dim, height, width], &self.device()) * self
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn tile_spatial() {
        use super::*;
        use burn::backend::NdArray;

        type B = NdArray<f32>;
        let device = &Default::default();

        let input = Tensor::<B, 2>::from_data([[1.0, 2.0], [3.0, 4.0]], device);
        let output = input.tile_spatial(2, 3);
        assert_eq!(output.dims(), [2, 2, 2, 3]);
        output.to_owned().slice([1..2, 0..1, 0..2, 0..3]).into_data().assert_eq(
            &Tensor::<B, 4>::full([1, 1, 2, 3], 3.0, device).into_data(),
            true,
        );
        output.slice([0..1, 1..2, 0..2, 0..3]).into_data().assert_eq(
            &Tensor::<B, 4>::full([1, 1, 2, 3], 2.0, device).into_data(),
            true,
        );
    }

    #[test]
    #[should_panic]
    fn tile_spatial_on_feature_map() {
        use super::*;
        use burn::backend::NdArray;

        let input = Tensor::<NdArray<f32>, 4>::zeros([1, 2, 3, 3], &Default::default());
        input.tile_spatial(4, 4);
    }
}
