//! Two-role compare schedule
//!
//! One compare register plays two roles: the outer role waits out the cycle
//! period, the inner role paces the toggles of a train. Every new deadline is
//! derived from the previous *scheduled* deadline, never from the counter
//! value sampled in the handler, so interrupt latency never accumulates.

use pulse_core::{CycleAnchor, PulseTrainConfig, TickRate, Ticks};

/// Which role the next compare match plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Waiting for the next cycle to start a train
    Outer,
    /// Pacing the toggles of a train
    Inner,
}

/// Train timing converted to counter ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub toggle: u64,
    pub cycle: Option<u64>,
    pub count: u32,
    pub anchor: CycleAnchor,
}

impl Timing {
    /// Convert `config` at `rate`; intervals shorter than one tick round up to one.
    pub fn from_config(config: &PulseTrainConfig, rate: TickRate) -> Self {
        let cycle = if config.is_cyclic() {
            Some(rate.ticks_for(config.cycle_interval()).max(1))
        } else {
            None
        };
        Self {
            toggle: rate.ticks_for(config.toggle_interval()).max(1),
            cycle,
            count: config.toggle_count(),
            anchor: config.cycle_anchor(),
        }
    }
}

/// What a compare match asks the handler to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    /// Outer match: a new train starts, no toggle yet
    CycleStart,
    /// Inner match with toggles left after this one
    Toggle,
    /// Inner match producing the last toggle of the train
    TrainEnd {
        /// Deadline of the next outer match, `None` for single-shot trains
        next_cycle: Option<Ticks>,
    },
    /// Match with nothing left to do
    Exhausted,
}

/// State of the shared compare register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareSchedule {
    role: Role,
    deadline: Ticks,
    remaining: u32,
    cycle_start: Ticks,
}

impl CompareSchedule {
    /// Schedule a train whose first toggle is one interval after `start`.
    pub fn start_train(start: Ticks, timing: &Timing) -> Self {
        Self {
            role: Role::Inner,
            deadline: start.offset(timing.toggle),
            remaining: timing.count,
            cycle_start: start,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Deadline the compare register must hold
    pub fn deadline(&self) -> Ticks {
        self.deadline
    }

    /// Toggles still to come in the current train
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance past the match at the current deadline.
    pub fn fire(&mut self, timing: &Timing) -> Fired {
        match self.role {
            Role::Outer => {
                self.cycle_start = self.deadline;
                self.remaining = timing.count;
                self.role = Role::Inner;
                self.deadline = self.deadline.offset(timing.toggle);
                Fired::CycleStart
            }
            Role::Inner if self.remaining == 0 => Fired::Exhausted,
            Role::Inner => {
                self.remaining -= 1;
                if self.remaining > 0 {
                    self.deadline = self.deadline.offset(timing.toggle);
                    return Fired::Toggle;
                }
                let Some(cycle) = timing.cycle else {
                    return Fired::TrainEnd { next_cycle: None };
                };
                let anchor = match timing.anchor {
                    CycleAnchor::TrainEnd => self.deadline,
                    CycleAnchor::CycleStart => self.cycle_start,
                };
                self.role = Role::Outer;
                self.deadline = anchor.offset(cycle);
                Fired::TrainEnd {
                    next_cycle: Some(self.deadline),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{Millis, DEFAULT_OUTPUT_LINE};

    fn timing(count: u32, toggle_ms: u32, cycle_ms: u32, anchor: CycleAnchor) -> Timing {
        let config = PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
            .toggle_count(count)
            .toggle_interval(Millis::from_millis(toggle_ms))
            .cycle_interval(Millis::from_millis(cycle_ms))
            .cycle_anchor(anchor)
            .build()
            .unwrap();
        Timing::from_config(&config, TickRate::from_hz(1000))
    }

    #[test]
    fn kth_deadline_is_start_plus_k_intervals() {
        let timing = timing(5, 20, 0, CycleAnchor::TrainEnd);
        let start = Ticks::new(1234);
        let mut schedule = CompareSchedule::start_train(start, &timing);

        for k in 1..=5u64 {
            assert_eq!(schedule.deadline(), start.offset(k * 20));
            let fired = schedule.fire(&timing);
            if k < 5 {
                assert_eq!(fired, Fired::Toggle);
            } else {
                assert_eq!(fired, Fired::TrainEnd { next_cycle: None });
            }
        }
        assert_eq!(schedule.fire(&timing), Fired::Exhausted);
    }

    #[test]
    fn train_end_anchor_measures_from_last_toggle() {
        let timing = timing(6, 300, 3000, CycleAnchor::TrainEnd);
        let mut schedule = CompareSchedule::start_train(Ticks::ZERO, &timing);
        for _ in 0..5 {
            schedule.fire(&timing);
        }
        assert_eq!(
            schedule.fire(&timing),
            Fired::TrainEnd {
                next_cycle: Some(Ticks::new(4800))
            }
        );
        assert_eq!(schedule.role(), Role::Outer);

        assert_eq!(schedule.fire(&timing), Fired::CycleStart);
        assert_eq!(schedule.role(), Role::Inner);
        assert_eq!(schedule.remaining(), 6);
        assert_eq!(schedule.deadline(), Ticks::new(5100));
    }

    #[test]
    fn cycle_start_anchor_keeps_a_fixed_period() {
        let timing = timing(6, 300, 3000, CycleAnchor::CycleStart);
        let mut schedule = CompareSchedule::start_train(Ticks::ZERO, &timing);
        let mut cycle_starts = heapless::Vec::<u64, 4>::new();

        for _ in 0..3 {
            for _ in 0..6 {
                if let Fired::TrainEnd {
                    next_cycle: Some(next),
                } = schedule.fire(&timing)
                {
                    cycle_starts.push(next.raw()).unwrap();
                }
            }
            assert_eq!(schedule.fire(&timing), Fired::CycleStart);
        }
        assert_eq!(cycle_starts.as_slice(), &[3000, 6000, 9000]);
    }

    #[test]
    fn sub_tick_interval_rounds_up() {
        let config = PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
            .toggle_count(2)
            .toggle_interval(Millis::from_millis(1))
            .build()
            .unwrap();
        let timing = Timing::from_config(&config, TickRate::from_hz(10));
        assert_eq!(timing.toggle, 1);
    }
}
