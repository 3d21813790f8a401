//! Action sampling from the spatial policy.
use tch::{Kind, Tensor};

/// Samples one index per row of `probs` with the Gumbel-max trick.
///
/// `argmax(log p + g)` with `g ~ Gumbel(0, 1)` is distributed as the
/// categorical distribution `p`. Probabilities are clipped to `[floor, 1]`
/// before the logarithm.
pub fn gumbel_max(probs: &Tensor, floor: f64) -> Tensor {
    let u = Tensor::rand_like(probs).clamp_min(1e-20);
    let gumbel = -(-u.log()).log();
    (probs.clamp(floor, 1.0).log() + gumbel).argmax(-1, false)
}

/// Most probable index of each row of `probs`.
pub fn greedy(probs: &Tensor) -> Tensor {
    probs.argmax(-1, false).to_kind(Kind::Int64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::tensor_to_vec_i64;
    use anyhow::Result;

    #[test]
    fn test_gumbel_max_follows_policy() -> Result<()> {
        tch::manual_seed(42);
        let n = 20_000;
        let probs = Tensor::from_slice(&[0.1f32, 0.6, 0.3, 0.0])
            .unsqueeze(0)
            .repeat([n, 1]);

        let samples = tensor_to_vec_i64(&gumbel_max(&probs, 1e-12))?;
        assert_eq!(samples.len(), n as usize);

        let mut counts = [0usize; 4];
        samples.iter().for_each(|&s| counts[s as usize] += 1);
        let freq = counts
            .iter()
            .map(|&c| c as f64 / n as f64)
            .collect::<Vec<_>>();
        assert!((freq[0] - 0.1).abs() < 0.02, "{:?}", freq);
        assert!((freq[1] - 0.6).abs() < 0.02, "{:?}", freq);
        assert!((freq[2] - 0.3).abs() < 0.02, "{:?}", freq);
        assert_eq!(counts[3], 0);
        Ok(())
    }

    #[test]
    fn test_greedy() -> Result<()> {
        let probs = Tensor::from_slice(&[0.1f32, 0.6, 0.3, 0.7, 0.2, 0.1]).view([2, 3]);
        assert_eq!(tensor_to_vec_i64(&greedy(&probs))?, vec![1, 0]);
        Ok(())
    }
}
