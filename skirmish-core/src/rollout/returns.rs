/// Computes n-step bootstrapped returns.
///
/// `rewards[t]` is the reward batch at step `t`, `last_value` the value
/// estimate of the state following the last step. Returns
/// `R[t] = rewards[t] + discount * R[t + 1]` with `R[N] = last_value`,
/// one batch per step (the bootstrap row is dropped).
///
/// All batches are assumed to have the width of `last_value`.
pub fn discounted_returns(rewards: &[Vec<f32>], last_value: &[f32], discount: f64) -> Vec<Vec<f32>> {
    let n = rewards.len();
    let discount = discount as f32;
    let mut r = Vec::with_capacity(n + 1);
    r.resize(n, Vec::new());
    r.push(last_value.to_vec());

    for t in (0..n).rev() {
        let r_t = rewards[t]
            .iter()
            .zip(&r[t + 1])
            .map(|(reward, next)| reward + discount * next)
            .collect();
        r[t] = r_t;
    }

    r.truncate(n);
    r
}
