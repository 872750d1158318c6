use crate::Activation;
use tch::{nn, Tensor};

impl nn::Module for Activation {
    fn forward(&self, xs: &Tensor) -> Tensor {
        use Activation::*;

        match *self {
            Linear => xs.shallow_clone(),
            Relu => xs.relu(),
            LRelu => lrelu(xs),
            Logistic => xs.sigmoid(),
            Tanh => xs.tanh(),
        }
    }
}

pub fn lrelu(tensor: &Tensor) -> Tensor {
    leaky_relu_ext(tensor, Some(0.2))
}

pub fn leaky_relu_ext(tensor: &Tensor, negative_slope: Option<f64>) -> Tensor {
    tensor.maximum(&(tensor * negative_slope.unwrap_or(0.01)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn::Module as _, Kind};

    #[test]
    fn lrelu_slope() {
        let xs = Tensor::of_slice(&[-10.0f32, -1.0, 0.0, 2.0]);
        let ys = Activation::LRelu.forward(&xs);
        let expect = Tensor::of_slice(&[-2.0f32, -0.2, 0.0, 2.0]);
        let diff = f64::from(&(ys - expect).abs().max());
        assert!(diff < 1e-6);
    }

    #[test]
    fn logistic_range() {
        let xs = Tensor::randn(&[64], (Kind::Float, tch::Device::Cpu)) * 10.0;
        let ys = Activation::Logistic.forward(&xs);
        assert!(bool::from(ys.ge(0.0).logical_and(&ys.le(1.0)).all()));
    }
}
