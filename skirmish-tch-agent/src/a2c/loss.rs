//! Loss of the actor-critic update.
use crate::util::tensor_to_f32;
use anyhow::Result;
use skirmish_core::record::{Record, RecordValue};
use tch::{Kind, Tensor};

/// Coefficients of the actor-critic loss.
#[derive(Debug, Clone, PartialEq)]
pub struct A2cLoss {
    entropy_coef: f64,
    prob_floor: f64,
}

/// Terms of the loss. Each is a scalar tensor.
pub struct LossTerms {
    /// Sum of the three terms below.
    pub total: Tensor,

    /// Policy-gradient term.
    pub policy: Tensor,

    /// Value-regression term.
    pub value: Tensor,

    /// Entropy bonus, already weighted.
    pub entropy: Tensor,

    /// Mean advantage, detached.
    pub advantage: Tensor,
}

impl A2cLoss {
    /// Constructs the loss.
    pub fn new(entropy_coef: f64, prob_floor: f64) -> Self {
        Self {
            entropy_coef,
            prob_floor,
        }
    }

    /// Computes the loss terms.
    ///
    /// * `policy` - action probabilities, `[batch, n_actions]`.
    /// * `value` - state values, `[batch]`.
    /// * `actions` - taken actions, `[batch]`, `Int64`.
    /// * `returns` - bootstrapped returns, `[batch]`.
    pub fn compute(
        &self,
        policy: &Tensor,
        value: &Tensor,
        actions: &Tensor,
        returns: &Tensor,
    ) -> LossTerms {
        let policy = policy.clamp(self.prob_floor, 1.0);
        let log_policy = policy.log();
        let adv = returns - value;

        let logli = log_policy
            .gather(-1, &actions.unsqueeze(-1), false)
            .squeeze_dim(-1);
        // summed over the batch and the actions
        let entropy = -(&policy * &log_policy).sum(Kind::Float);

        let policy_loss = -(logli * adv.detach()).mean(Kind::Float);
        let value_loss = adv.square().mean(Kind::Float);
        let entropy_loss = -self.entropy_coef * entropy;
        let total = &policy_loss + &value_loss + &entropy_loss;

        LossTerms {
            total,
            policy: policy_loss,
            value: value_loss,
            entropy: entropy_loss,
            advantage: adv.detach().mean(Kind::Float),
        }
    }
}

impl LossTerms {
    /// Scalar summaries of the update.
    pub fn record(&self) -> Result<Record> {
        Ok(Record::from_slice(&[
            ("advantage", RecordValue::Scalar(tensor_to_f32(&self.advantage)?)),
            ("loss/policy", RecordValue::Scalar(tensor_to_f32(&self.policy)?)),
            ("loss/value", RecordValue::Scalar(tensor_to_f32(&self.value)?)),
            ("loss/entropy", RecordValue::Scalar(tensor_to_f32(&self.entropy)?)),
            ("loss", RecordValue::Scalar(tensor_to_f32(&self.total)?)),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::tensor_to_vec_f32;

    fn inputs() -> (Tensor, Tensor, Tensor, Tensor) {
        let policy = Tensor::from_slice(&[0.5f32, 0.5, 0.0, 0.25, 0.25, 0.5]).view([2, 3]);
        let value = Tensor::from_slice(&[1.0f32, 0.0]);
        let actions = Tensor::from_slice(&[0i64, 2]);
        let returns = Tensor::from_slice(&[3.0f32, -1.0]);
        (policy, value, actions, returns)
    }

    #[test]
    fn test_loss_values() -> Result<()> {
        let (policy, value, actions, returns) = inputs();
        let terms = A2cLoss::new(1e-3, 1e-12).compute(&policy, &value, &actions, &returns);

        // advantages: [2, -1]
        let ln2 = 2f32.ln();
        let policy_loss = -(2.0 * -ln2 + -1.0 * -ln2) / 2.0;
        let value_loss = (4.0 + 1.0) / 2.0;
        let h0 = ln2; // the zero entry contributes 1e-12 * ln(1e-12)
        let h1 = 0.5 * 4f32.ln() + 0.5 * ln2;
        let entropy_loss = -1e-3 * (h0 + h1);

        let close = |t: &Tensor, v: f32| -> Result<()> {
            let x = tensor_to_f32(t)?;
            assert!((x - v).abs() < 1e-5, "{} != {}", x, v);
            Ok(())
        };
        close(&terms.policy, policy_loss)?;
        close(&terms.value, value_loss)?;
        close(&terms.entropy, entropy_loss)?;
        close(&terms.advantage, 0.5)?;
        close(&terms.total, policy_loss + value_loss + entropy_loss)?;

        let record = terms.record()?;
        assert_eq!(record.len(), 5);
        assert!((record.get_scalar("loss/value")? - 2.5).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_policy_term_does_not_train_value() -> Result<()> {
        let (policy, value, actions, returns) = inputs();
        let logits = policy.clamp_min(1e-3).log().set_requires_grad(true);
        let value = value.set_requires_grad(true);
        let loss = A2cLoss::new(1e-3, 1e-12);

        let terms = loss.compute(&logits.softmax(-1, Kind::Float), &value, &actions, &returns);
        terms.policy.backward();
        assert!(logits.grad().defined());
        assert!(!value.grad().defined());

        let value = Tensor::from_slice(&[1.0f32, 0.0]).set_requires_grad(true);
        let terms = loss.compute(&policy, &value, &actions, &returns);
        terms.value.backward();
        // d/dv mean((R - v)^2) = -(R - v) for a batch of two
        assert_eq!(tensor_to_vec_f32(&value.grad())?, vec![-2.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_entropy_sums_over_batch() -> Result<()> {
        let (policy, value, actions, returns) = inputs();
        let loss = A2cLoss::new(1e-3, 1e-12);
        let single = loss.compute(&policy, &value, &actions, &returns);
        let double = loss.compute(
            &Tensor::cat(&[&policy, &policy], 0),
            &Tensor::cat(&[&value, &value], 0),
            &Tensor::cat(&[&actions, &actions], 0),
            &Tensor::cat(&[&returns, &returns], 0),
        );

        let h = tensor_to_f32(&single.entropy)?;
        assert!((tensor_to_f32(&double.entropy)? - 2.0 * h).abs() < 1e-6);
        // per-sample terms stay the same
        assert!((tensor_to_f32(&double.value)? - tensor_to_f32(&single.value)?).abs() < 1e-6);
        Ok(())
    }
}
