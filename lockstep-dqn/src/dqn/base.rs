//! DQN agent.
use super::{config::DqnConfig, explorer, explorer::DqnExplorer};
use anyhow::Result;
use chrono::Local;
use lockstep_core::{
    error::LockstepError,
    record::{Record, RecordValue},
    replay_buffer::{BatchBase, ReplayBufferConfig, TrajectoryWindow, UniformReplayBuffer},
    Agent, Env, Network, Optimizer, ReplayBufferBase, Space, Step, Trajectory,
};
use log::{info, trace};
use std::marker::PhantomData;

/// Observer invoked with every recorded transition.
pub type StepCallback<O, A, S> = Box<dyn FnMut(&Trajectory<O, A, S>)>;

/// Clipped-quadratic (Huber) loss of one TD error.
fn huber(d: f32) -> f32 {
    let a = d.abs();
    if a <= 1. {
        0.5 * d * d
    } else {
        a - 0.5
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Value-based agent with an epsilon-greedy behavior policy and a slowly
/// tracking target network.
///
/// One [`update`](Agent::update) call runs the full cycle:
///
/// ```mermaid
/// graph LR
///     A[Dqn] -->|Env::Act| B[Env]
///     B -->|Step| A
///     A -->|Trajectory| C[UniformReplayBuffer]
///     C -->|TrajectoryWindow| A
/// ```
///
/// The agent starts *idle* with no buffer allocated. The first update call
/// lazily sizes the buffer to `max_replayed_sequence_length` steps times
/// the environment's lane count and begins *warming* it through
/// interaction; once at least `train_sequence_length + 1` steps are held,
/// every update call also performs gradient steps.
///
/// Each gradient step samples windows of `train_sequence_length + 1`
/// transitions. The trailing step supplies next-state observations: the
/// online network's value at the taken action is regressed towards
/// `reward + discount * max_a target(next_obs)`, with the bootstrap forced
/// to zero where the next step ends the episode, and transitions taken on
/// a terminal observation excluded from the loss entirely. The per-cell
/// loss is the clipped-quadratic (Huber) form, whose gradient saturates
/// for large errors; the summed loss is averaged over the sampled windows
/// only, so the per-lane weight is constant regardless of how many lanes
/// terminate early within a window.
///
/// Every `target_update_period` gradient steps the target network tracks
/// the online network as an exponential moving average with coefficient
/// `target_update_forget_factor`.
pub struct Dqn<E, N, O, OPT>
where
    E: Env,
    N: Network,
    O: BatchBase + Clone + Into<N::Input>,
    OPT: Optimizer<N>,
    E::Obs: Into<O>,
    E::Act: From<Vec<i64>>,
    E::ActSpace: Space<Element = i64>,
{
    train_sequence_length: usize,
    max_replayed_sequence_length: usize,
    batch_size: usize,
    n_gradient_steps_per_update: usize,
    discount_factor: f32,
    target_update_period: usize,
    target_update_forget_factor: f64,
    explorer: DqnExplorer,
    seed: u64,
    qnet: N,
    qnet_tgt: N,
    opt: OPT,
    buffer: Option<UniformReplayBuffer<O, Vec<i64>, N::State>>,
    callbacks: Vec<StepCallback<O, Vec<i64>, N::State>>,
    train: bool,
    n_opts: usize,
    target_update_counter: usize,
    env_steps: usize,
    episodes: usize,
    phantom: PhantomData<E>,
}

impl<E, N, O, OPT> Dqn<E, N, O, OPT>
where
    E: Env,
    N: Network,
    O: BatchBase + Clone + Into<N::Input>,
    OPT: Optimizer<N>,
    E::Obs: Into<O>,
    E::Act: From<Vec<i64>>,
    E::ActSpace: Space<Element = i64>,
{
    /// Constructs a DQN agent from a configuration, an online network and
    /// an optimizer. The target network starts as a copy of the online
    /// network.
    ///
    /// Fails on an invalid configuration; no agent instance is created.
    pub fn build(config: DqnConfig, network: N, optimizer: OPT) -> Result<Self> {
        config.validate()?;
        let qnet_tgt = network.copy();

        Ok(Self {
            train_sequence_length: config.train_sequence_length,
            max_replayed_sequence_length: config.max_replayed_sequence_length,
            batch_size: config.batch_size,
            n_gradient_steps_per_update: config.n_gradient_steps_per_update,
            discount_factor: config.discount_factor,
            target_update_period: config.target_update_period,
            target_update_forget_factor: config.target_update_forget_factor,
            explorer: config.explorer,
            seed: config.seed,
            qnet: network,
            qnet_tgt,
            opt: optimizer,
            buffer: None,
            callbacks: Vec::new(),
            train: true,
            n_opts: 0,
            target_update_counter: 0,
            env_steps: 0,
            episodes: 0,
            phantom: PhantomData,
        })
    }

    /// Registers an observer invoked with every recorded transition.
    pub fn register_callback(&mut self, callback: StepCallback<O, Vec<i64>, N::State>) {
        self.callbacks.push(callback);
    }

    /// The online network.
    pub fn network(&self) -> &N {
        &self.qnet
    }

    /// The target network.
    pub fn target_network(&self) -> &N {
        &self.qnet_tgt
    }

    /// Number of gradient steps taken so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Number of completed environment steps, summed across lanes.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }

    /// Number of completed episodes, summed across lanes.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Chooses per-lane action indices for a step, exploring in training
    /// mode and acting greedily otherwise. Chosen actions are checked
    /// against the action space; a violation is fatal.
    fn policy_actions(&mut self, step: &Step<E>, space: &E::ActSpace) -> Result<Vec<i64>> {
        let input: N::Input = Into::<O>::into(step.obs.clone()).into();
        let values = self.qnet.forward(&input);
        debug_assert_eq!(values.len(), step.batch_size());

        let actions = if self.train {
            self.explorer.action(&values, space)
        } else {
            explorer::greedy_actions(&values)
        };
        for a in actions.iter() {
            if !space.contains(a) {
                return Err(LockstepError::InvalidAction(format!("{:?}", a)).into());
            }
        }
        Ok(actions)
    }

    /// One gradient step: samples windows, regresses the online network
    /// towards the masked Bellman targets and applies one optimizer update.
    /// Returns the masked Huber loss averaged over the sampled windows.
    fn td_step(
        qnet: &mut N,
        qnet_tgt: &mut N,
        opt: &mut OPT,
        buffer: &mut UniformReplayBuffer<O, Vec<i64>, N::State>,
        batch_size: usize,
        sequence_length: usize,
        discount_factor: f32,
    ) -> Result<f32> {
        let window: TrajectoryWindow<O, Vec<i64>, N::State> =
            buffer.sample_windows(batch_size, sequence_length + 1)?;
        let steps = &window.steps;
        let inputs = steps
            .iter()
            .map(|s| s.obs.clone().into())
            .collect::<Vec<N::Input>>();

        // Replay both networks from the state recorded at the window start,
        // in time order, so recurrent networks stay consistent.
        qnet.set_state(&steps[0].state);
        qnet_tgt.set_state(&steps[0].state);
        let online = inputs.iter().map(|i| qnet.forward(i)).collect::<Vec<_>>();
        let target = inputs
            .iter()
            .map(|i| qnet_tgt.forward(i))
            .collect::<Vec<_>>();

        let mut grad = qnet.zero_gradient();
        let mut loss = 0.;
        for t in 0..sequence_length {
            let q_t = &online[t];
            let num_samples = q_t.len();
            let mut grad_output = q_t
                .iter()
                .map(|row| vec![0.; row.len()])
                .collect::<Vec<_>>();

            for b in 0..num_samples {
                // A First can only follow a Last inside recorded data, so a
                // next kind of First marks a transition taken on a terminal
                // observation; it carries no Bellman constraint.
                let next_kind = steps[t].next_kind[b];
                if next_kind.is_first() {
                    continue;
                }
                let bootstrap = if next_kind.is_last() {
                    0.
                } else {
                    // target network decides the next state's value; max
                    // over actions decouples it from the network being
                    // optimized
                    target[t + 1][b]
                        .iter()
                        .cloned()
                        .fold(f32::NEG_INFINITY, f32::max)
                };
                let a = steps[t].act[b] as usize;
                let expected = steps[t].reward[b] + discount_factor * bootstrap;
                let d = expected - q_t[b][a];
                loss += huber(d);
                // Huber gradient w.r.t. the online value: the TD error
                // clipped to unit magnitude, so outliers cannot blow up
                // the step.
                grad_output[b][a] = (-d).clamp(-1., 1.) / num_samples as f32;
            }

            qnet.backward(&inputs[t], &grad_output, &mut grad);
        }
        opt.update(qnet, &grad);

        Ok(loss / batch_size as f32)
    }

    fn update_(&mut self, env: &mut E, max_steps: usize, max_episodes: usize) -> Result<Record> {
        if self.buffer.is_none() {
            let config = ReplayBufferConfig::default()
                .max_length(self.max_replayed_sequence_length)
                .n_lanes(env.batch_size())
                .seed(self.seed);
            self.buffer = Some(UniformReplayBuffer::build(&config)?);
            info!(
                "Allocated replay buffer: {} lanes x {} steps",
                env.batch_size(),
                self.max_replayed_sequence_length
            );
        }

        // interaction
        let mut steps_done = 0;
        let mut episodes_done = 0;
        let mut step = env.current_step();
        while steps_done < max_steps && episodes_done < max_episodes {
            let state = self.qnet.state();
            let actions = self.policy_actions(&step, env.action_space())?;
            let next = env.step(&E::Act::from(actions.clone()));

            steps_done += next.kind.iter().filter(|k| !k.is_last()).count();
            episodes_done += next.kind.iter().filter(|k| k.is_last()).count();

            let trajectory = Trajectory::new(
                next.kind.clone(),
                step.obs.clone().into(),
                actions,
                next.reward.clone(),
                state,
            );
            for callback in self.callbacks.iter_mut() {
                callback(&trajectory);
            }
            if let Some(buffer) = self.buffer.as_mut() {
                buffer.record(trajectory)?;
            }
            step = next;
        }
        self.env_steps += steps_done;
        self.episodes += episodes_done;

        // training
        let mut record = Record::empty();
        let window_len = self.train_sequence_length + 1;
        let n_gradient_steps = self.n_gradient_steps_per_update;
        let batch_size = self.batch_size;
        let sequence_length = self.train_sequence_length;
        let discount_factor = self.discount_factor;
        let target_update_period = self.target_update_period;
        let forget_factor = self.target_update_forget_factor;
        let mut loss_critic = 0.;
        let mut trained = false;

        let Self {
            ref mut qnet,
            ref mut qnet_tgt,
            ref mut opt,
            ref mut buffer,
            ref mut n_opts,
            ref mut target_update_counter,
            ..
        } = *self;
        if let Some(buffer) = buffer.as_mut() {
            if buffer.len() >= window_len {
                let saved_state = qnet.state();
                for _ in 0..n_gradient_steps {
                    loss_critic += Self::td_step(
                        qnet,
                        qnet_tgt,
                        opt,
                        buffer,
                        batch_size,
                        sequence_length,
                        discount_factor,
                    )?;

                    *n_opts += 1;
                    *target_update_counter += 1;
                    if *target_update_counter == target_update_period {
                        *target_update_counter = 0;
                        qnet_tgt.track(qnet, forget_factor);
                    }
                }
                qnet.set_state(&saved_state);
                loss_critic /= n_gradient_steps as f32;
                trained = true;
            } else {
                trace!(
                    "Warming up: {} of {} steps buffered",
                    buffer.len(),
                    window_len
                );
            }
        }

        if trained {
            record.insert("loss_critic", RecordValue::Scalar(loss_critic));
        }
        if let DqnExplorer::EpsilonGreedy(egreedy) = &self.explorer {
            record.insert("eps", RecordValue::Scalar(egreedy.eps() as f32));
        }
        record.insert("env_steps", RecordValue::Scalar(self.env_steps as f32));
        record.insert("episodes", RecordValue::Scalar(self.episodes as f32));
        record.insert("n_opts", RecordValue::Scalar(self.n_opts as f32));
        record.insert("datetime", RecordValue::DateTime(Local::now()));

        Ok(record)
    }
}

impl<E, N, O, OPT> Agent<E> for Dqn<E, N, O, OPT>
where
    E: Env,
    N: Network,
    O: BatchBase + Clone + Into<N::Input>,
    OPT: Optimizer<N>,
    E::Obs: Into<O>,
    E::Act: From<Vec<i64>>,
    E::ActSpace: Space<Element = i64>,
{
    fn act(&mut self, env: &E) -> Result<E::Act> {
        let step = env.current_step();
        let actions = self.policy_actions(&step, env.action_space())?;
        Ok(E::Act::from(actions))
    }

    fn update(&mut self, env: &mut E, max_steps: usize, max_episodes: usize) -> Result<Record> {
        self.update_(env, max_steps, max_episodes)
    }

    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }
}
