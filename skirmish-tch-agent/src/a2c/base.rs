//! A2C agent implemented with tch-rs.
use super::{config::A2cConfig, greedy, gumbel_max, A2cLoss, A2cModel};
use crate::{
    model::{ModelBase, SubModel},
    preprocess::ObsPreprocessor,
    util::{tensor_to_vec_f32, tensor_to_vec_i64, InputShape},
};
use anyhow::{Context, Result};
use log::{debug, trace};
use serde::{de::DeserializeOwned, Serialize};
use skirmish_core::{
    act::unravel_batch,
    record::{Record, RecordValue, Recorder},
    ActionAvailability, Agent, EpisodeRewards, FunctionCall, FunctionId, RolloutStorage,
    TimeStep,
};
use skirmish_tensorboard::TensorboardRecorder;
use std::{fs, marker::PhantomData, path::Path};
use tch::{no_grad, Device, Kind, Tensor};

/// Single-step advantage actor-critic agent.
///
/// Every call of [`Agent::step`] samples one point of the screen per game
/// and stores the transition. Once `n_steps` transitions are stored, the next
/// call uses the rollout for one gradient step and then discards it.
/// Switching to eval mode drops a partial rollout.
///
/// * `O` - observation of a game.
/// * `P` - converts observations into model inputs.
/// * `M` - policy/value network.
/// * `R` - destination of training summaries and episode rewards.
pub struct A2c<O, P, M, R>
where
    O: TimeStep,
    P: ObsPreprocessor<O>,
    M: SubModel<Input = Vec<Tensor>, Output = (Tensor, Tensor)>,
    R: Recorder,
{
    model: A2cModel<M>,
    preprocessor: P,
    loss: A2cLoss,
    rollouts: RolloutStorage<Vec<Tensor>, Tensor>,
    episode_rewards: EpisodeRewards,
    recorder: R,
    n_steps: usize,
    discount_factor: f64,
    prob_floor: f64,
    screen_size: i64,
    spatial_function: FunctionId,
    fallback_function: FunctionId,
    steps: usize,
    n_opts: usize,
    train: bool,
    device: Device,
    phantom: PhantomData<O>,
}

impl<O, P, M, R> A2c<O, P, M, R>
where
    O: TimeStep,
    P: ObsPreprocessor<O>,
    M: SubModel<Input = Vec<Tensor>, Output = (Tensor, Tensor)>,
    M::Config: Serialize + DeserializeOwned + InputShape + Clone,
    R: Recorder,
{
    /// Constructs the agent.
    ///
    /// The input shape of the network is taken from `preprocessor` and the
    /// screen size of `config`.
    pub fn build(config: A2cConfig<M::Config>, preprocessor: P, recorder: R) -> Result<Self> {
        config.validate()?;
        let device: Device = config.device.unwrap_or(crate::Device::Cpu).into();
        let mut model_config = config
            .model_config
            .clone()
            .context("No model config is given for A2C agent")?;
        model_config.set_in_channels(preprocessor.n_channels());
        model_config.set_screen_size(config.screen_size);
        let model = A2cModel::build(
            model_config,
            &config.opt_config,
            config.clip_grad_norm,
            device,
        )?;

        Ok(Self {
            model,
            preprocessor,
            loss: A2cLoss::new(config.entropy_coef, config.prob_floor),
            rollouts: RolloutStorage::with_capacity(config.n_steps),
            episode_rewards: EpisodeRewards::new(),
            recorder,
            n_steps: config.n_steps,
            discount_factor: config.discount_factor,
            prob_floor: config.prob_floor,
            screen_size: config.screen_size,
            spatial_function: config.spatial_function,
            fallback_function: config.fallback_function,
            steps: 0,
            n_opts: 0,
            train: config.train,
            device,
            phantom: PhantomData,
        })
    }

    /// Number of calls of [`Agent::step`].
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of gradient steps.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Number of transitions in the current rollout.
    pub fn rollout_len(&self) -> usize {
        self.rollouts.len()
    }

    /// Destination of the records.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Runs one optimizer step on the current rollout.
    ///
    /// Returns must have been computed. The summaries are written to the
    /// recorder, keyed by the rollout index `steps / n_steps`, and returned.
    pub fn train_rollout(&mut self) -> Result<Record> {
        let inputs = self.rollouts.inputs()?;
        let n_inputs = inputs.obs.first().map_or(0, |o| o.len());
        let obs = (0..n_inputs)
            .map(|i| {
                let xs = inputs.obs.iter().map(|o| o[i].shallow_clone()).collect::<Vec<_>>();
                Tensor::cat(&xs, 0)
            })
            .collect::<Vec<_>>();
        let actions = Tensor::cat(inputs.actions, 0).to(self.device);
        let returns = Tensor::from_slice(&inputs.returns).to(self.device);
        let rollout_value = inputs.values.iter().sum::<f32>() / inputs.values.len() as f32;
        trace!(
            "Train on rollout: steps = {}, envs = {}",
            inputs.n_steps,
            inputs.n_envs
        );

        let (policy, value) = self.model.forward(&obs);
        let terms = self.loss.compute(&policy, &value, &actions, &returns);
        self.model.backward_step(&terms.total);
        self.n_opts += 1;

        let mut record = terms.record()?;
        record.insert(
            "opt_steps",
            RecordValue::Scalar((self.steps / self.n_steps) as f32),
        );
        record.insert(
            "returns",
            RecordValue::Scalar(returns.mean(Kind::Float).double_value(&[]) as f32),
        );
        record.insert(
            "value",
            RecordValue::Scalar(value.detach().mean(Kind::Float).double_value(&[]) as f32),
        );
        record.insert("value/rollout", RecordValue::Scalar(rollout_value));
        debug!(
            "Rollout {}: loss = {:?}",
            self.steps / self.n_steps,
            record.get_scalar("loss")
        );
        self.recorder.write(record.clone());

        Ok(record)
    }

    /// Computes returns of the current rollout and trains on it.
    ///
    /// `reward` is observed after the last action of the rollout and `xs` are
    /// the model inputs of the current observations, used for the bootstrap.
    fn finish_rollout(&mut self, reward: &[f32], xs: &[Tensor]) -> Result<()> {
        self.rollouts.push_reward(reward.to_vec());
        let last_value = no_grad(|| self.model.forward(xs).1);
        let last_value = tensor_to_vec_f32(&last_value)?;
        self.rollouts
            .compute_returns(&last_value, self.discount_factor)?;
        self.train_rollout()?;
        self.rollouts = RolloutStorage::with_capacity(self.n_steps);
        Ok(())
    }

    fn function_calls(&self, obs: &[O], act: &Tensor) -> Result<Vec<FunctionCall>> {
        let indices = tensor_to_vec_i64(act)?;
        let coords = unravel_batch(&indices, (self.screen_size, self.screen_size))?;

        Ok(obs
            .iter()
            .zip(coords)
            .map(|(o, c)| {
                if !o.is_available(self.spatial_function) {
                    FunctionCall::no_arg_queued(self.fallback_function)
                } else {
                    let (x, y) = c.to_xy();
                    FunctionCall::at_point(self.spatial_function, x, y)
                }
            })
            .collect())
    }
}

impl<O, M> A2c<O, crate::preprocess::ScreenPreprocessor, M, TensorboardRecorder>
where
    O: TimeStep,
    M: SubModel<Input = Vec<Tensor>, Output = (Tensor, Tensor)>,
    M::Config: Serialize + DeserializeOwned + InputShape + Clone,
{
    /// Constructs the agent writing summaries to the log directory of `config`.
    pub fn build_with_tensorboard(
        config: A2cConfig<M::Config>,
        preprocessor: crate::preprocess::ScreenPreprocessor,
    ) -> Result<Self> {
        let recorder = TensorboardRecorder::new(&config.log_dir);
        Self::build(config, preprocessor, recorder)
    }
}

impl<O, P, M, R> Agent<O> for A2c<O, P, M, R>
where
    O: TimeStep,
    P: ObsPreprocessor<O>,
    M: SubModel<Input = Vec<Tensor>, Output = (Tensor, Tensor)>,
    M::Config: Serialize + DeserializeOwned + InputShape + Clone,
    R: Recorder,
{
    fn step(&mut self, obs: &[O]) -> Result<Vec<FunctionCall>> {
        let reward = obs.iter().map(|o| o.reward()).collect::<Vec<_>>();
        let first = obs.iter().any(|o| o.first());
        if let Some(sum) = self.episode_rewards.push(&reward, first) {
            let mut record = Record::from_scalar("opt_steps", (self.steps / self.n_steps) as f32);
            record.insert("episode_reward", RecordValue::Array1(sum));
            self.recorder.write(record);
        }

        let xs = self.preprocessor.preprocess(obs, self.device)?;

        if self.train && self.rollouts.len() == self.n_steps {
            self.finish_rollout(&reward, &xs)?;
        }
        self.steps += 1;

        let (act, value) = no_grad(|| {
            let (policy, value) = self.model.forward(&xs);
            let act = match self.train {
                true => gumbel_max(&policy, self.prob_floor),
                false => greedy(&policy),
            };
            (act, value)
        });

        let calls = self.function_calls(obs, &act)?;
        if self.train {
            let value = tensor_to_vec_f32(&value)?;
            self.rollouts.insert(xs, act, reward, value);
        }

        Ok(calls)
    }

    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        if !self.rollouts.is_empty() {
            debug!("Drop partial rollout of {} steps", self.rollouts.len());
            self.rollouts = RolloutStorage::with_capacity(self.n_steps);
        }
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.model.save(path.join("a2c.pt"))?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.model.load(path.join("a2c.pt"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fully_conv::{FullyConv, FullyConvConfig},
        preprocess::{ScreenFeature, ScreenPreprocessor},
    };
    use ndarray::Array3;
    use skirmish_core::record::{BufferedRecorder, NullRecorder};
    use tempdir::TempDir;

    const SCREEN: i64 = 8;

    struct Tick {
        reward: f32,
        first: bool,
        available: Vec<FunctionId>,
        screen: Array3<i32>,
    }

    impl Tick {
        fn new(reward: f32, first: bool, available: Vec<FunctionId>) -> Self {
            let mut screen = Array3::zeros((1, SCREEN as usize, SCREEN as usize));
            screen[[0, 3, 4]] = 1;
            Self {
                reward,
                first,
                available,
                screen,
            }
        }
    }

    impl TimeStep for Tick {
        fn reward(&self) -> f32 {
            self.reward
        }

        fn first(&self) -> bool {
            self.first
        }

        fn available_actions(&self) -> &[FunctionId] {
            &self.available
        }

        fn feature_screen(&self) -> &Array3<i32> {
            &self.screen
        }
    }

    type TestAgent = A2c<Tick, ScreenPreprocessor, FullyConv, BufferedRecorder>;

    fn config(n_steps: usize) -> A2cConfig<FullyConvConfig> {
        A2cConfig::default()
            .model_config(FullyConvConfig::default().hidden_dim(16))
            .n_steps(n_steps)
            .screen_size(SCREEN)
    }

    fn build_agent_with(config: A2cConfig<FullyConvConfig>) -> Result<TestAgent> {
        let preprocessor = ScreenPreprocessor::new(vec![ScreenFeature::categorical(0, 2)])?;
        A2c::build(config, preprocessor, BufferedRecorder::new())
    }

    fn build_agent(n_steps: usize) -> Result<TestAgent> {
        build_agent_with(config(n_steps))
    }

    fn ticks(reward: f32, first: bool) -> Vec<Tick> {
        (0..2)
            .map(|_| Tick::new(reward, first, vec![FunctionId::ATTACK_SCREEN]))
            .collect()
    }

    #[test]
    fn test_trains_every_n_steps() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut agent = build_agent(2)?;

        for _ in 0..5 {
            agent.step(&ticks(1.0, false))?;
        }
        assert_eq!(agent.steps(), 5);
        assert_eq!(agent.n_opts(), 2);
        assert_eq!(agent.rollout_len(), 1);

        let opt_steps = agent
            .recorder()
            .with_key("loss")
            .map(|r| r.get_scalar("opt_steps"))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(opt_steps, vec![1.0, 2.0]);

        let record = agent.recorder().with_key("loss").next().unwrap();
        for key in ["loss/policy", "loss/value", "loss/entropy", "advantage", "returns"] {
            assert!(record.get_scalar(key)?.is_finite(), "{}", key);
        }
        Ok(())
    }

    #[test]
    fn test_spatial_action_on_screen() -> Result<()> {
        let mut agent = build_agent(4)?;

        for _ in 0..3 {
            let calls = agent.step(&ticks(0.0, false))?;
            assert_eq!(calls.len(), 2);
            for call in calls {
                assert_eq!(call.function, FunctionId::ATTACK_SCREEN);
                let (x, y) = call.point().unwrap();
                assert!((0..SCREEN as i32).contains(&x));
                assert!((0..SCREEN as i32).contains(&y));
            }
        }
        Ok(())
    }

    #[test]
    fn test_fallback_when_unavailable() -> Result<()> {
        let mut agent = build_agent(4)?;
        let obs = vec![
            Tick::new(0.0, false, vec![FunctionId::SELECT_ARMY]),
            Tick::new(0.0, false, vec![FunctionId::ATTACK_SCREEN]),
        ];

        let calls = agent.step(&obs)?;
        assert_eq!(calls[0], FunctionCall::no_arg_queued(FunctionId::SELECT_ARMY));
        assert_eq!(calls[0].arguments, vec![vec![0]]);
        assert_eq!(calls[1].function, FunctionId::ATTACK_SCREEN);
        Ok(())
    }

    #[test]
    fn test_eval_collects_nothing() -> Result<()> {
        let mut agent = build_agent(2)?;
        agent.eval();
        assert!(!agent.is_train());

        for _ in 0..5 {
            agent.step(&ticks(1.0, false))?;
        }
        assert_eq!(agent.n_opts(), 0);
        assert_eq!(agent.rollout_len(), 0);
        assert!(agent.recorder().with_key("loss").next().is_none());
        Ok(())
    }

    #[test]
    fn test_train_after_eval_waits_for_full_rollout() -> Result<()> {
        let mut agent = build_agent(2)?;
        agent.eval();
        agent.step(&ticks(1.0, false))?;
        agent.step(&ticks(1.0, false))?;

        agent.train();
        agent.step(&ticks(1.0, false))?;
        assert_eq!(agent.steps(), 3);
        assert_eq!(agent.n_opts(), 0);
        assert_eq!(agent.rollout_len(), 1);

        // a partial rollout is dropped when switching to eval
        agent.eval();
        assert_eq!(agent.rollout_len(), 0);
        agent.train();

        agent.step(&ticks(1.0, false))?;
        agent.step(&ticks(1.0, false))?;
        assert_eq!(agent.n_opts(), 0);
        agent.step(&ticks(1.0, false))?;
        assert_eq!(agent.n_opts(), 1);
        assert_eq!(agent.rollout_len(), 1);

        let record = agent.recorder().with_key("loss").next().unwrap();
        assert_eq!(record.get_scalar("opt_steps")?, 2.0);
        Ok(())
    }

    #[test]
    fn test_returns_pair_actions_with_following_rewards() -> Result<()> {
        // without discount the returns are the rewards themselves
        let mut agent = build_agent_with(config(2).discount_factor(0.0))?;

        agent.step(&ticks(10.0, false))?;
        agent.step(&ticks(1.0, false))?;
        agent.step(&ticks(3.0, false))?;
        assert_eq!(agent.n_opts(), 1);

        // the reward arriving with the first observation is not used
        let record = agent.recorder().with_key("returns").next().unwrap();
        assert!((record.get_scalar("returns")? - 2.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_episode_reward_record() -> Result<()> {
        let mut agent = build_agent(10)?;

        agent.step(&ticks(1.0, false))?;
        agent.step(&ticks(2.0, false))?;
        agent.step(&ticks(0.5, true))?;

        let rewards = agent
            .recorder()
            .with_key("episode_reward")
            .map(|r| r.get_array1("episode_reward"))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(rewards, vec![vec![3.5, 3.5]]);
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new("a2c")?;
        let path = dir.path().join("params");

        let agent = build_agent(2)?;
        agent.save_params(&path)?;
        assert!(path.join("a2c.pt").is_file());

        let preprocessor = ScreenPreprocessor::new(vec![ScreenFeature::categorical(0, 2)])?;
        let mut agent: A2c<Tick, _, FullyConv, _> =
            A2c::build(config(2), preprocessor, NullRecorder::new())?;
        agent.load_params(&path)?;
        agent.eval();
        assert_eq!(agent.step(&ticks(0.0, false))?.len(), 2);
        Ok(())
    }
}
