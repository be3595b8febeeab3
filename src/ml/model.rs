// ============================================================
// Layer 5 — AlexNet Model
// ============================================================
// A CIFAR-sized AlexNet variant. The feature extractor is five
// 3×3 convolution stages with three maxpool+ReLU reductions:
//
//   [N,  3, 32, 32]  conv(3→64, stride 2, pad 1)
//   [N, 64, 16, 16]  maxpool 2 → relu
//   [N, 64,  8,  8]  conv(64→192, pad 1), maxpool 2 → relu
//   [N, 192, 4,  4]  conv(192→384, pad 1) → relu
//   [N, 384, 4,  4]  conv(384→256, pad 1) → relu
//   [N, 256, 4,  4]  conv(256→256, pad 1), maxpool 2 → relu
//   [N, 256, 2,  2]  flatten → [N, 1024]
//
// followed by the classifier head:
//
//   dropout(0.5) → fc(1024→4096) → relu
//   dropout(0.5) → fc(4096→4096) → relu → fc(4096→output_dim)
//
// forward() returns BOTH the logits and the flattened
// pre-classifier features — downstream analysis (embedding
// plots etc.) wants the penultimate representation, and
// exposing it here avoids a second forward pass.
//
// Initialization is declared per layer at construction time:
//   conv weights — Kaiming normal, fan-in, ReLU gain √2
//   fc weights   — Xavier normal, ReLU gain √2
//   all biases   — zero
// Under a fixed backend seed this is bit-reproducible.
//
// Reference: Burn Book §3 (Building Blocks)
//            He et al. (2015); Glorot & Bengio (2010)

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Initializer, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

/// Width of the flattened feature vector: 256 channels × 2 × 2
pub const FEATURE_DIM: usize = 256 * 2 * 2;

/// Width of the two hidden classifier layers
const HIDDEN_DIM: usize = 4096;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct AlexNetConfig {
    /// Number of output classes (logit dimensionality)
    pub output_dim: usize,

    /// Dropout rate in the classifier head
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl AlexNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AlexNet<B> {
        // Each layer declares its own initialization strategy here,
        // rather than being pattern-matched by type afterwards.
        let conv_init = Initializer::KaimingNormal {
            gain: std::f64::consts::SQRT_2, // ReLU gain
            fan_out_only: false,
        };
        let fc_init = Initializer::XavierNormal {
            gain: std::f64::consts::SQRT_2,
        };

        let conv = |channels: [usize; 2], stride: usize| {
            Conv2dConfig::new(channels, [3, 3])
                .with_stride([stride, stride])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .with_initializer(conv_init.clone())
        };

        AlexNet {
            conv1: zero_conv_bias(conv([3, 64], 2).init(device)),
            conv2: zero_conv_bias(conv([64, 192], 1).init(device)),
            conv3: zero_conv_bias(conv([192, 384], 1).init(device)),
            conv4: zero_conv_bias(conv([384, 256], 1).init(device)),
            conv5: zero_conv_bias(conv([256, 256], 1).init(device)),
            pool1: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            pool2: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            pool3: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            fc1: zero_fc_bias(
                LinearConfig::new(FEATURE_DIM, HIDDEN_DIM)
                    .with_initializer(fc_init.clone())
                    .init(device),
            ),
            fc2: zero_fc_bias(
                LinearConfig::new(HIDDEN_DIM, HIDDEN_DIM)
                    .with_initializer(fc_init.clone())
                    .init(device),
            ),
            head: zero_fc_bias(
                LinearConfig::new(HIDDEN_DIM, self.output_dim)
                    .with_initializer(fc_init)
                    .init(device),
            ),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// Burn's initializers draw the bias from the same distribution
/// as the weights; the reference scheme wants zero biases.
fn zero_conv_bias<B: Backend>(mut conv: Conv2d<B>) -> Conv2d<B> {
    conv.bias = conv.bias.map(|b| b.map(|t| t.zeros_like()));
    conv
}

fn zero_fc_bias<B: Backend>(mut linear: Linear<B>) -> Linear<B> {
    linear.bias = linear.bias.map(|b| b.map(|t| t.zeros_like()));
    linear
}

#[derive(Module, Debug)]
pub struct AlexNet<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub conv3: Conv2d<B>,
    pub conv4: Conv2d<B>,
    pub conv5: Conv2d<B>,
    pub pool1: MaxPool2d,
    pub pool2: MaxPool2d,
    pub pool3: MaxPool2d,
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub head: Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> AlexNet<B> {
    /// images: [batch, 3, 32, 32] → (logits: [batch, output_dim],
    /// penultimate features: [batch, 1024]).
    ///
    /// Pure with respect to the parameters — nothing is mutated.
    pub fn forward(&self, images: Tensor<B, 4>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let x = self.conv1.forward(images);
        let x = relu(self.pool1.forward(x));
        let x = self.conv2.forward(x);
        let x = relu(self.pool2.forward(x));
        let x = relu(self.conv3.forward(x));
        let x = relu(self.conv4.forward(x));
        let x = self.conv5.forward(x);
        let x = relu(self.pool3.forward(x));

        // [batch, 256, 2, 2] → [batch, 1024]
        let features = x.flatten::<2>(1, 3);

        let x = self.dropout.forward(features.clone());
        let x = relu(self.fc1.forward(x));
        let x = self.dropout.forward(x);
        let x = relu(self.fc2.forward(x));
        let logits = self.head.forward(x);

        (logits, features)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        let images = Tensor::zeros([2, 3, 32, 32], &device);
        let (logits, features) = model.forward(images);
        assert_eq!(logits.dims(), [2, 10]);
        assert_eq!(features.dims(), [2, FEATURE_DIM]);
    }

    #[test]
    fn test_parameter_count_matches_reference() {
        // Known trainable-parameter count for output_dim = 10
        let device = Default::default();
        let model: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        assert_eq!(model.num_params(), 23_272_266);
    }

    #[test]
    fn test_biases_start_at_zero() {
        let device = Default::default();
        let model: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        let bias_sum: f32 = model
            .conv1
            .bias
            .clone()
            .unwrap()
            .val()
            .abs()
            .sum()
            .into_scalar();
        assert_eq!(bias_sum, 0.0);
        let fc_bias_sum: f32 = model.fc1.bias.clone().unwrap().val().abs().sum().into_scalar();
        assert_eq!(fc_bias_sum, 0.0);
    }

    #[test]
    fn test_initialization_reproducible_under_seed() {
        let device = Default::default();
        let images = Tensor::<TestBackend, 4>::ones([1, 3, 32, 32], &device);

        TestBackend::seed(1234);
        let model_a: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        let (logits_a, _) = model_a.forward(images.clone());

        TestBackend::seed(1234);
        let model_b: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        let (logits_b, _) = model_b.forward(images);

        assert_eq!(logits_a.into_data(), logits_b.into_data());
    }

    #[test]
    fn test_forward_is_deterministic_without_autodiff() {
        // On a non-autodiff backend dropout is inactive, so two
        // passes over the same input must agree exactly.
        let device = Default::default();
        let model: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        let images = Tensor::ones([1, 3, 32, 32], &device);
        let (a, _) = model.forward(images.clone());
        let (b, _) = model.forward(images);
        assert_eq!(a.into_data(), b.into_data());
    }
}
