use crate::common::*;

#[derive(Debug)]
pub struct BceWithLogitsLossInit {
    pub pos_weight: Option<Tensor>,
    pub reduction: Reduction,
}

impl BceWithLogitsLossInit {
    pub fn default(reduction: Reduction) -> Self {
        Self {
            pos_weight: None,
            reduction,
        }
    }

    pub fn build(self) -> BceWithLogitsLoss {
        let Self {
            pos_weight,
            reduction,
        } = self;

        let pos_weight = pos_weight.map(|weight| weight.detach().set_requires_grad(false));

        BceWithLogitsLoss {
            pos_weight,
            reduction,
        }
    }
}

/// Binary cross entropy on raw logits.
#[derive(Debug)]
pub struct BceWithLogitsLoss {
    pos_weight: Option<Tensor>,
    reduction: Reduction,
}

impl BceWithLogitsLoss {
    pub fn forward(&self, input: &Tensor, target: &Tensor) -> Tensor {
        debug_assert_eq!(
            input.size(),
            target.size(),
            "input and target tensors must have equal shape"
        );
        debug_assert!(
            bool::from(target.ge(0.0).logical_and(&target.le(1.0)).all()),
            "target values must be in range of [0.0, 1.0]"
        );

        let device = input.device();

        // return zero tensor if (1) input is empty and (2) using mean reduction
        if input.numel() == 0 && self.reduction == Reduction::Mean {
            return Tensor::zeros(&[], (Kind::Float, device)).set_requires_grad(false);
        }

        let weight: Option<&Tensor> = None;
        input.binary_cross_entropy_with_logits(
            target,
            weight,
            self.pos_weight.as_ref(),
            self.reduction,
        )
    }

    /// Compute the loss against a target filled with a constant value.
    ///
    /// It is the common case in adversarial training, where the target is
    /// either "real" (1.0, or a smoothed value below 1.0) or "fake" (0.0).
    pub fn forward_const(&self, input: &Tensor, value: f64) -> Tensor {
        let target = input.full_like(value).detach();
        self.forward(input, &target)
    }
}
