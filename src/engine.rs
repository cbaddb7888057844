use std::fmt;

use strum_macros::Display;

/// Current mode of the timer. Phases are mutually exclusive; `Idle` is only
/// reachable as the initial state and is never re-entered.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Working,
    #[strum(serialize = "Resting")]
    ShortResting,
    #[strum(serialize = "Resting")]
    LongResting,
}

impl Phase {
    pub fn is_resting(&self) -> bool {
        matches!(self, Phase::ShortResting | Phase::LongResting)
    }

    /// Status-line label; unlike `Display`, this distinguishes the two rests.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Working => "Working",
            Phase::ShortResting => "Short rest",
            Phase::LongResting => "Long rest",
        }
    }
}

/// Rejected construction parameters. Raised once, before an engine exists.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A phase duration was zero; every interval lasts at least one second.
    ZeroDuration(&'static str),
    /// Fewer than one work interval per long rest makes the cycle undefined.
    ZeroCycles,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDuration(field) => {
                write!(f, "{} must be at least 1 second", field)
            }
            ConfigError::ZeroCycles => write!(f, "cycles per long rest must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated engine construction parameters, all in whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub work_secs: u32,
    pub short_rest_secs: u32,
    pub long_rest_secs: u32,
    pub cycles_per_long_rest: u32,
}

impl EngineConfig {
    pub fn new(
        work_secs: u32,
        short_rest_secs: u32,
        long_rest_secs: u32,
        cycles_per_long_rest: u32,
    ) -> Result<Self, ConfigError> {
        if work_secs == 0 {
            return Err(ConfigError::ZeroDuration("work duration"));
        }
        if short_rest_secs == 0 {
            return Err(ConfigError::ZeroDuration("short rest duration"));
        }
        if long_rest_secs == 0 {
            return Err(ConfigError::ZeroDuration("long rest duration"));
        }
        if cycles_per_long_rest == 0 {
            return Err(ConfigError::ZeroCycles);
        }
        Ok(Self {
            work_secs,
            short_rest_secs,
            long_rest_secs,
            cycles_per_long_rest,
        })
    }
}

impl Default for EngineConfig {
    /// The classic pomodoro: 25 minutes work, 5/15 minute rests, long rest
    /// every fourth interval.
    fn default() -> Self {
        Self {
            work_secs: 1500,
            short_rest_secs: 300,
            long_rest_secs: 900,
            cycles_per_long_rest: 4,
        }
    }
}

/// Notifications emitted synchronously while the engine mutates state.
/// Collaborators (bell, title, theme) subscribe; the engine never waits on
/// them and ignores whatever they do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A work interval began (command or rest timeout). Cue: start bell.
    WorkStarted,
    /// A rest began (command or work timeout). Cue: finish bell.
    RestStarted { long: bool },
    /// One second elapsed; carries the post-decrement countdown and the
    /// phase the tick was accounted against.
    Tick { phase: Phase, remaining_secs: u32 },
    /// A work interval ran to completion.
    CycleCompleted,
    /// A long rest was entered, closing a full round of work intervals.
    LongCycleCompleted,
}

/// Read-only view of the engine for presentation; see [`TimerEngine::snapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub phase: Phase,
    pub remaining_secs: u32,
    pub is_running: bool,
    pub completed_long_cycles: u32,
    pub completed_work_intervals: u32,
    pub total_worked_secs: u64,
}

type Subscriber = Box<dyn FnMut(&EngineEvent)>;

/// The pomodoro state machine: owns phase, countdown, and cycle bookkeeping.
///
/// Commands (`start_work`, `start_rest`, `toggle_running`) and ticks arrive
/// strictly serialized on one thread; the engine itself never blocks and no
/// command can fail once construction has validated the configuration.
pub struct TimerEngine {
    config: EngineConfig,
    phase: Phase,
    remaining_secs: u32,
    is_running: bool,
    cycles_until_long_rest: u32,
    completed_long_cycles: u32,
    completed_work_intervals: u32,
    total_worked_secs: u64,
    subscribers: Vec<Subscriber>,
}

impl TimerEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            remaining_secs: config.work_secs,
            is_running: false,
            cycles_until_long_rest: config.cycles_per_long_rest - 1,
            completed_long_cycles: 0,
            completed_work_intervals: 0,
            total_worked_secs: 0,
            subscribers: Vec::new(),
        }
    }

    /// Registers a notification sink. Sinks run synchronously inside the
    /// triggering call, in subscription order.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&EngineEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Begins a work interval at full duration, even if one is mid-flight.
    pub fn start_work(&mut self) {
        self.phase = Phase::Working;
        self.remaining_secs = self.config.work_secs;
        self.is_running = true;
        self.emit(EngineEvent::WorkStarted);
    }

    /// Begins a short or long rest at full duration.
    pub fn start_rest(&mut self, long: bool) {
        self.phase = if long {
            Phase::LongResting
        } else {
            Phase::ShortResting
        };
        self.remaining_secs = if long {
            self.config.long_rest_secs
        } else {
            self.config.short_rest_secs
        };
        self.is_running = true;
        self.emit(EngineEvent::RestStarted { long });
    }

    /// Flips the paused/running gate without touching phase or countdown.
    /// Ignored while `Idle`; there is nothing to pause before the first start.
    pub fn toggle_running(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.is_running = !self.is_running;
    }

    /// Accounts one elapsed second and fires the phase transition when the
    /// countdown bottoms out. The tick source is gated off while paused, so
    /// a tick that still lands on a paused engine is a stale in-flight one
    /// and is dropped.
    pub fn on_tick(&mut self) {
        if !self.is_running {
            return;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.phase == Phase::Working {
            self.total_worked_secs += 1;
        }
        self.emit(EngineEvent::Tick {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
        });

        if self.remaining_secs > 0 {
            return;
        }

        match self.phase {
            Phase::Working => {
                if self.cycles_until_long_rest > 0 {
                    self.cycles_until_long_rest -= 1;
                    self.start_rest(false);
                } else {
                    self.start_rest(true);
                    self.cycles_until_long_rest = self.config.cycles_per_long_rest - 1;
                    self.completed_long_cycles += 1;
                    self.emit(EngineEvent::LongCycleCompleted);
                }
                self.completed_work_intervals += 1;
                self.emit(EngineEvent::CycleCompleted);
            }
            Phase::ShortResting | Phase::LongResting => {
                self.start_work();
            }
            // Idle is never running, so a tick cannot land here.
            Phase::Idle => {}
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Work intervals left before the next long rest, counting the current one.
    pub fn cycles_until_long_rest(&self) -> u32 {
        self.cycles_until_long_rest
    }

    pub fn completed_work_intervals(&self) -> u32 {
        self.completed_work_intervals
    }

    pub fn completed_long_cycles(&self) -> u32 {
        self.completed_long_cycles
    }

    pub fn total_worked_secs(&self) -> u64 {
        self.total_worked_secs
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Point-in-time copy of everything the presentation renders from.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            is_running: self.is_running,
            completed_long_cycles: self.completed_long_cycles,
            completed_work_intervals: self.completed_work_intervals,
            total_worked_secs: self.total_worked_secs,
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("remaining_secs", &self.remaining_secs)
            .field("is_running", &self.is_running)
            .field("cycles_until_long_rest", &self.cycles_until_long_rest)
            .field("completed_long_cycles", &self.completed_long_cycles)
            .field("completed_work_intervals", &self.completed_work_intervals)
            .field("total_worked_secs", &self.total_worked_secs)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
