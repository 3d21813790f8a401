//! Per-episode reward bookkeeping.
use log::info;

/// Running sum of rewards of the current episode, one entry per environment.
///
/// The sum is reported and cleared on the tick that starts a new episode.
#[derive(Debug, Clone, Default)]
pub struct EpisodeRewards {
    sum: Option<Vec<f32>>,
    n_episodes: usize,
}

impl EpisodeRewards {
    /// Constructs an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reward batch.
    ///
    /// When `first` is set the accumulator is cleared after adding `reward`,
    /// and the sum including `reward` is returned.
    pub fn push(&mut self, reward: &[f32], first: bool) -> Option<Vec<f32>> {
        let sum = match self.sum.take() {
            Some(mut sum) => {
                sum.iter_mut().zip(reward).for_each(|(s, r)| *s += r);
                sum
            }
            None => reward.to_vec(),
        };

        if first {
            self.n_episodes += 1;
            info!("Episode {}: reward = {:?}", self.n_episodes, sum);
            Some(sum)
        } else {
            self.sum = Some(sum);
            None
        }
    }

    /// Current running sum, `None` right after a reset.
    pub fn current(&self) -> Option<&[f32]> {
        self.sum.as_deref()
    }

    /// Number of episode boundaries seen so far.
    pub fn n_episodes(&self) -> usize {
        self.n_episodes
    }
}
