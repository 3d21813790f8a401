use super::discounted_returns;
use crate::error::SkirmishError;
use log::trace;

/// Transitions of one rollout window.
///
/// `O` is a batch of observations and `A` a batch of actions across the
/// parallel environments; rewards and value estimates are stored as one
/// `f32` per environment. Shapes are not validated on insertion.
///
/// The storage is meant to be filled once, consumed by a training update and
/// then dropped.
#[derive(Debug, Clone)]
pub struct RolloutStorage<O, A> {
    obs: Vec<O>,
    actions: Vec<A>,
    rewards: Vec<Vec<f32>>,
    values: Vec<Vec<f32>>,
    returns: Option<Vec<Vec<f32>>>,
}

/// Training inputs of a rollout, in the order observations, actions, returns.
///
/// `returns` and `values` are flattened time-major: the entry of step `t` and
/// environment `e` is at `t * n_envs + e`, matching a concatenation of the
/// observation and action batches along their leading dimension.
#[derive(Debug)]
pub struct RolloutInputs<'a, O, A> {
    /// Observation batches, one per step.
    pub obs: &'a [O],

    /// Action batches, one per step.
    pub actions: &'a [A],

    /// Bootstrapped returns.
    pub returns: Vec<f32>,

    /// Value estimates taken when the actions were sampled.
    pub values: Vec<f32>,

    /// Number of steps in the rollout.
    pub n_steps: usize,

    /// Number of parallel environments.
    pub n_envs: usize,
}

impl<O, A> Default for RolloutStorage<O, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, A> RolloutStorage<O, A> {
    /// Constructs an empty storage.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Constructs an empty storage with room for `capacity` transitions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obs: Vec::with_capacity(capacity),
            actions: Vec::with_capacity(capacity),
            rewards: Vec::with_capacity(capacity + 1),
            values: Vec::with_capacity(capacity),
            returns: None,
        }
    }

    /// Appends a transition.
    pub fn insert(&mut self, obs: O, action: A, reward: Vec<f32>, value: Vec<f32>) {
        self.obs.push(obs);
        self.actions.push(action);
        self.rewards.push(reward);
        self.values.push(value);
    }

    /// Appends a reward batch without a transition.
    ///
    /// The reward of an observation is the outcome of the previous action.
    /// Pushing the reward observed after the last transition makes
    /// [`compute_returns`](Self::compute_returns) pair every action with the
    /// reward it produced.
    pub fn push_reward(&mut self, reward: Vec<f32>) {
        self.rewards.push(reward);
    }

    /// Computes bootstrapped discounted returns.
    ///
    /// The returns use the last `len()` reward batches. Without
    /// [`push_reward`](Self::push_reward) these are the rewards passed to
    /// [`insert`](Self::insert).
    pub fn compute_returns(&mut self, last_value: &[f32], discount: f64) -> Result<(), SkirmishError> {
        if self.obs.is_empty() {
            return Err(SkirmishError::EmptyRollout);
        }
        if !(0.0..1.0).contains(&discount) {
            return Err(SkirmishError::DiscountOutOfRange(discount));
        }
        let n_envs = self.n_envs();
        if last_value.len() != n_envs {
            return Err(SkirmishError::BatchSizeMismatch {
                expected: n_envs,
                actual: last_value.len(),
            });
        }

        let offset = self.rewards.len() - self.obs.len();
        trace!(
            "Compute returns: steps = {}, envs = {}, reward offset = {}",
            self.obs.len(),
            n_envs,
            offset
        );
        self.returns = Some(discounted_returns(
            &self.rewards[offset..],
            last_value,
            discount,
        ));
        Ok(())
    }

    /// Returns per step, available after [`compute_returns`](Self::compute_returns).
    pub fn returns(&self) -> Option<&[Vec<f32>]> {
        self.returns.as_deref()
    }

    /// Value estimates per step.
    pub fn values(&self) -> &[Vec<f32>] {
        &self.values
    }

    /// Reward batches, including one pushed with [`push_reward`](Self::push_reward).
    pub fn rewards(&self) -> &[Vec<f32>] {
        &self.rewards
    }

    /// Training inputs of the rollout.
    pub fn inputs(&self) -> Result<RolloutInputs<'_, O, A>, SkirmishError> {
        let returns = self
            .returns
            .as_ref()
            .ok_or(SkirmishError::ReturnsNotComputed)?;

        Ok(RolloutInputs {
            obs: &self.obs,
            actions: &self.actions,
            returns: returns.iter().flatten().copied().collect(),
            values: self.values.iter().flatten().copied().collect(),
            n_steps: self.obs.len(),
            n_envs: self.n_envs(),
        })
    }

    /// Number of stored transitions.
    pub fn len(&self) -> usize {
        self.obs.len()
    }

    /// Returns `true` if no transition is stored.
    pub fn is_empty(&self) -> bool {
        self.obs.is_empty()
    }

    /// Number of parallel environments, taken from the first reward batch.
    pub fn n_envs(&self) -> usize {
        self.rewards.first().map_or(0, |r| r.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Storage = RolloutStorage<Vec<[f32; 2]>, Vec<i64>>;

    fn fill(storage: &mut Storage, rewards: &[[f32; 2]]) {
        for (t, r) in rewards.iter().enumerate() {
            let obs = vec![[t as f32, 0.0], [t as f32, 1.0]];
            let act = vec![t as i64, t as i64 + 1];
            storage.insert(obs, act, r.to_vec(), vec![0.5, 0.5]);
        }
    }

    #[test]
    fn test_compute_returns() {
        let mut storage = Storage::new();
        fill(&mut storage, &[[1.0, 1.0], [2.0, 2.0]]);
        storage.compute_returns(&[3.0, 3.0], 0.95).unwrap();

        let returns = storage.returns().unwrap();
        assert_eq!(returns.len(), 2);
        for (r, e) in returns.iter().flatten().zip([4.7075f32, 4.7075, 4.85, 4.85]) {
            assert!((r - e).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pushed_reward_shifts_alignment() {
        let mut storage = Storage::new();
        fill(&mut storage, &[[0.0, 0.0], [1.0, 1.0]]);
        storage.push_reward(vec![2.0, 2.0]);
        assert_eq!(storage.rewards().len(), 3);

        storage.compute_returns(&[3.0, 3.0], 0.95).unwrap();
        let returns = storage.returns().unwrap();
        assert!((returns[0][0] - 4.7075).abs() < 1e-5);
        assert!((returns[1][1] - 4.85).abs() < 1e-5);
    }

    #[test]
    fn test_inputs_share_leading_dimension() {
        let mut storage = Storage::with_capacity(3);
        assert!(matches!(
            storage.inputs(),
            Err(SkirmishError::ReturnsNotComputed)
        ));

        fill(&mut storage, &[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
        storage.compute_returns(&[0.0, 0.0], 0.9).unwrap();
        let inputs = storage.inputs().unwrap();

        let n_obs: usize = inputs.obs.iter().map(|o| o.len()).sum();
        let n_act: usize = inputs.actions.iter().map(|a| a.len()).sum();
        assert_eq!(inputs.n_steps, 3);
        assert_eq!(inputs.n_envs, 2);
        assert_eq!(n_obs, 6);
        assert_eq!(n_act, n_obs);
        assert_eq!(inputs.returns.len(), n_obs);
        assert_eq!(inputs.values.len(), n_obs);
    }

    #[test]
    fn test_errors() {
        let mut storage = Storage::new();
        assert_eq!(
            storage.compute_returns(&[0.0, 0.0], 0.9),
            Err(SkirmishError::EmptyRollout)
        );

        fill(&mut storage, &[[1.0, 1.0]]);
        assert_eq!(
            storage.compute_returns(&[0.0, 0.0], 1.0),
            Err(SkirmishError::DiscountOutOfRange(1.0))
        );
        assert_eq!(
            storage.compute_returns(&[0.0], 0.5),
            Err(SkirmishError::BatchSizeMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(storage.compute_returns(&[0.0, 0.0], 0.0).is_ok());
    }
}
