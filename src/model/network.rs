use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::PaddingConfig2d;
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Five-layer fully convolutional regressor (degraded RGB in, enhanced RGB out)
///
/// Every layer uses "same" padding, so output shape equals input shape.
#[derive(Module, Debug)]
pub struct EnhanceNet<B: Backend> {
    extract: Conv2d<B>,
    shrink: Conv2d<B>,
    map1: Conv2d<B>,
    map2: Conv2d<B>,
    reconstruct: Conv2d<B>,
}

/// (in channels, out channels, kernel) for each layer
pub const LAYERS: [(usize, usize, usize); 5] = [
    (3, 64, 9),
    (64, 32, 5),
    (32, 32, 3),
    (32, 16, 3),
    (16, 3, 3),
];

impl<B: Backend> EnhanceNet<B> {
    pub fn new(device: &B::Device) -> Self {
        let conv = |(input, output, kernel): (usize, usize, usize)| -> Conv2d<B> {
            Conv2dConfig::new([input, output], [kernel, kernel])
                .with_padding(PaddingConfig2d::Same)
                .init(device)
        };

        Self {
            extract: conv(LAYERS[0]),
            shrink: conv(LAYERS[1]),
            map1: conv(LAYERS[2]),
            map2: conv(LAYERS[3]),
            reconstruct: conv(LAYERS[4]),
        }
    }

    /// `[batch, 3, height, width]` in, same shape out
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.extract.forward(input));
        let x = relu(self.shrink.forward(x));
        let x = relu(self.map1.forward(x));
        let x = relu(self.map2.forward(x));
        self.reconstruct.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_forward_preserves_shape() {
        let device = Default::default();
        let model = EnhanceNet::<NdArray<f32>>::new(&device);
        let input = Tensor::<NdArray<f32>, 4>::zeros([2, 3, 12, 10], &device);
        let output = model.forward(input);
        assert_eq!(output.dims(), [2, 3, 12, 10]);
    }

    #[test]
    fn test_parameter_count() {
        let device = Default::default();
        let model = EnhanceNet::<NdArray<f32>>::new(&device);
        let expected: usize = LAYERS
            .iter()
            .map(|&(i, o, k)| i * o * k * k + o)
            .sum();
        assert_eq!(model.num_params(), expected);
    }
}
