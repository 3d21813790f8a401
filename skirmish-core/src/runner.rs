//! Interaction loop between an [`Env`] and an [`Agent`].
use crate::{Agent, Env};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};

/// Configuration of [`Runner`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Number of agent steps before the loop stops.
    pub max_steps: usize,

    /// Interval of progress logging in steps. `0` disables it.
    #[serde(default)]
    pub log_interval: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            log_interval: 0,
        }
    }
}

impl RunnerConfig {
    /// Sets the number of steps.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the logging interval.
    pub fn log_interval(mut self, v: usize) -> Self {
        self.log_interval = v;
        self
    }
}

/// Drives an agent on an environment for a fixed number of steps.
///
/// The environment is reset once; episodes restart inside the game and are
/// signalled through [`TimeStep::first`](crate::TimeStep::first).
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Constructs a runner.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Runs the loop and returns the number of steps taken.
    ///
    /// Errors of the environment or the agent stop the loop and are returned.
    pub fn run<E, A>(&self, env: &mut E, agent: &mut A) -> Result<usize>
    where
        E: Env,
        A: Agent<E::Obs>,
    {
        info!(
            "Start running {} steps on {} environments",
            self.config.max_steps,
            env.n_envs()
        );
        let mut obs = env.reset()?;

        for step in 0..self.config.max_steps {
            let acts = agent.step(&obs)?;
            obs = env.step(&acts)?;

            if self.config.log_interval > 0 && (step + 1) % self.config.log_interval == 0 {
                info!("{} steps done", step + 1);
            }
        }

        Ok(self.config.max_steps)
    }
}
