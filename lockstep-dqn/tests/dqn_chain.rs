//! End-to-end test of the DQN agent on a tiny two-armed bandit.
//!
//! The environment runs two lanes in lockstep. Every episode is one decision
//! long: from the start observation, arm 1 pays a reward of 1 and arm 0 pays
//! nothing, after which the lane reports its terminal observation and resets
//! on the following tick. A tabular action-value network trained with plain
//! SGD must learn to prefer arm 1.
use anyhow::Result;
use lockstep_core::{
    Act, Agent, DiscreteSpace, Env, Network, Obs, Optimizer, Step, StepKind,
};
use lockstep_dqn::{Dqn, DqnConfig, DqnExplorer, EpsilonGreedy};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Debug)]
struct ObsBatch(Vec<i64>);

impl Obs for ObsBatch {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<ObsBatch> for Vec<i64> {
    fn from(obs: ObsBatch) -> Self {
        obs.0
    }
}

#[derive(Clone, Debug)]
struct ActBatch(Vec<i64>);

impl Act for ActBatch {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<i64>> for ActBatch {
    fn from(a: Vec<i64>) -> Self {
        Self(a)
    }
}

/// Two lanes, two arms, one decision per episode. Observation 0 is the
/// start of an episode, observation 1 its terminal; a lane sitting on the
/// terminal observation restarts on the next tick regardless of the action.
struct BanditEnv {
    state: Vec<i64>,
    last_kind: Vec<StepKind>,
    last_reward: Vec<f32>,
    space: DiscreteSpace,
}

impl Env for BanditEnv {
    type Config = ();
    type Obs = ObsBatch;
    type Act = ActBatch;
    type ActSpace = DiscreteSpace;
    type Info = ();

    fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            state: vec![0, 0],
            last_kind: vec![StepKind::First, StepKind::First],
            last_reward: vec![0., 0.],
            space: DiscreteSpace::new(2)?,
        })
    }

    fn batch_size(&self) -> usize {
        self.state.len()
    }

    fn current_step(&self) -> Step<Self> {
        Step::new(
            self.last_kind.clone(),
            ObsBatch(self.state.clone()),
            self.last_reward.clone(),
            (),
        )
    }

    fn step(&mut self, a: &Self::Act) -> Step<Self> {
        for lane in 0..self.state.len() {
            if self.state[lane] == 0 {
                self.last_reward[lane] = if a.0[lane] == 1 { 1. } else { 0. };
                self.last_kind[lane] = StepKind::Last;
                self.state[lane] = 1;
            } else {
                self.last_reward[lane] = 0.;
                self.last_kind[lane] = StepKind::First;
                self.state[lane] = 0;
            }
        }
        self.current_step()
    }

    fn reset(&mut self) -> Step<Self> {
        for lane in 0..self.state.len() {
            self.state[lane] = 0;
            self.last_kind[lane] = StepKind::First;
            self.last_reward[lane] = 0.;
        }
        self.current_step()
    }

    fn action_space(&self) -> &Self::ActSpace {
        &self.space
    }
}

/// A two-state, two-action lookup table. Its "parameters" are the table
/// entries themselves, so the gradient accumulator has the same shape.
#[derive(Clone, Debug, PartialEq)]
struct TabularQ {
    q: Vec<Vec<f32>>,
}

impl TabularQ {
    fn zeros() -> Self {
        Self {
            q: vec![vec![0.; 2]; 2],
        }
    }
}

impl Network for TabularQ {
    type Input = Vec<i64>;
    type State = ();
    type Gradient = Vec<Vec<f32>>;

    fn forward(&mut self, input: &Self::Input) -> Vec<Vec<f32>> {
        input.iter().map(|&s| self.q[s as usize].clone()).collect()
    }

    fn backward(
        &mut self,
        input: &Self::Input,
        grad_output: &[Vec<f32>],
        grad: &mut Self::Gradient,
    ) {
        for (s, row) in input.iter().zip(grad_output.iter()) {
            for (a, g) in row.iter().enumerate() {
                grad[*s as usize][a] += g;
            }
        }
    }

    fn zero_gradient(&self) -> Self::Gradient {
        vec![vec![0.; 2]; 2]
    }

    fn state(&self) -> Self::State {}

    fn set_state(&mut self, _state: &Self::State) {}

    fn copy(&self) -> Self {
        self.clone()
    }

    fn track(&mut self, source: &Self, forget_factor: f64) {
        let beta = forget_factor as f32;
        for (row, src_row) in self.q.iter_mut().zip(source.q.iter()) {
            for (v, s) in row.iter_mut().zip(src_row.iter()) {
                *v = beta * *v + (1. - beta) * s;
            }
        }
    }
}

struct Sgd {
    lr: f32,
}

impl Optimizer<TabularQ> for Sgd {
    fn update(&mut self, network: &mut TabularQ, gradient: &Vec<Vec<f32>>) {
        for (row, grad_row) in network.q.iter_mut().zip(gradient.iter()) {
            for (v, g) in row.iter_mut().zip(grad_row.iter()) {
                *v -= self.lr * g;
            }
        }
    }
}

type BanditDqn = Dqn<BanditEnv, TabularQ, Vec<i64>, Sgd>;

fn config(eps: f64) -> DqnConfig {
    DqnConfig::default()
        .train_sequence_length(1)
        .max_replayed_sequence_length(200)
        .batch_size(16)
        .discount_factor(0.9)
        .target_update_period(1)
        .target_update_forget_factor(0.1)
        .explorer(DqnExplorer::EpsilonGreedy(EpsilonGreedy::constant(eps)))
        .seed(42)
}

#[test]
fn learns_the_rewarded_arm() -> Result<()> {
    init();
    fastrand::seed(42);
    let mut env = BanditEnv::build(&(), 0)?;
    let config = config(0.5).n_gradient_steps_per_update(2);
    let mut agent = BanditDqn::build(config, TabularQ::zeros(), Sgd { lr: 0.5 })?;

    for _ in 0..50 {
        agent.update(&mut env, 50, usize::MAX)?;
    }

    let q = &agent.network().q;
    assert!(
        q[0][1] > 0.9 && q[0][0] < 0.1,
        "start-state values did not converge: {:?}",
        q
    );

    agent.eval();
    env.reset();
    let a = agent.act(&env)?;
    assert_eq!(a.0, vec![1, 1]);
    Ok(())
}

#[test]
fn counts_steps_and_episodes_across_lanes() -> Result<()> {
    init();
    let mut env = BanditEnv::build(&(), 0)?;
    let mut agent = BanditDqn::build(config(0.5), TabularQ::zeros(), Sgd { lr: 0.1 })?;

    // each tick moves both lanes; episodes are one decision long, so ticks
    // alternate between two episode ends and two fresh starts
    agent.update(&mut env, 4, usize::MAX)?;
    assert_eq!(agent.env_steps(), 4);
    assert_eq!(agent.episodes(), 4);
    Ok(())
}

#[test]
fn reports_no_loss_while_warming_up() -> Result<()> {
    init();
    let mut env = BanditEnv::build(&(), 0)?;
    let config = config(0.5).train_sequence_length(3);
    let mut agent = BanditDqn::build(config, TabularQ::zeros(), Sgd { lr: 0.1 })?;

    // two ticks buffer two steps, short of the four a window needs
    let record = agent.update(&mut env, 2, usize::MAX)?;
    assert!(record.get_scalar("loss_critic").is_err());
    assert_eq!(agent.n_opts(), 0);

    let record = agent.update(&mut env, 10, usize::MAX)?;
    assert!(record.get_scalar("loss_critic").is_ok());
    assert!(agent.n_opts() > 0);
    Ok(())
}

#[test]
fn exact_value_table_has_zero_loss_and_stays_fixed() -> Result<()> {
    init();
    fastrand::seed(5);
    let mut env = BanditEnv::build(&(), 0)?;
    // the true values of this bandit: episodes end after one decision, so
    // nothing is bootstrapped, and transitions taken on the terminal
    // observation are excluded from the loss. The terminal row is arbitrary.
    let exact = TabularQ {
        q: vec![vec![0., 1.], vec![37., 37.]],
    };
    let mut agent = BanditDqn::build(config(0.), exact.clone(), Sgd { lr: 0.5 })?;

    for _ in 0..10 {
        let record = agent.update(&mut env, 20, usize::MAX)?;
        if let Ok(loss) = record.get_scalar("loss_critic") {
            assert!(loss.abs() < 1e-6, "nonzero loss: {}", loss);
        }
    }
    assert!(agent.n_opts() > 0);
    assert_eq!(agent.network().q, exact.q);
    Ok(())
}

#[test]
fn unit_forget_factor_freezes_the_target_network() -> Result<()> {
    init();
    fastrand::seed(9);
    let mut env = BanditEnv::build(&(), 0)?;
    let initial = TabularQ {
        q: vec![vec![0.5, 0.5], vec![0., 0.]],
    };
    let config = config(0.5).target_update_forget_factor(1.);
    let mut agent = BanditDqn::build(config, initial.clone(), Sgd { lr: 0.5 })?;

    for _ in 0..20 {
        agent.update(&mut env, 20, usize::MAX)?;
    }
    assert!(agent.n_opts() > 0);
    assert_ne!(agent.network().q, initial.q);
    assert_eq!(agent.target_network().q, initial.q);
    Ok(())
}

#[test]
fn track_interpolates_parameters() {
    let mut a = TabularQ {
        q: vec![vec![4., 0.], vec![0., 8.]],
    };
    let b = TabularQ {
        q: vec![vec![0., 2.], vec![0., 0.]],
    };

    let mut copied = a.clone();
    copied.track(&b, 0.);
    assert_eq!(copied.q, b.q);

    a.track(&b, 0.75);
    assert_eq!(a.q, vec![vec![3., 0.5], vec![0., 6.]]);
}
