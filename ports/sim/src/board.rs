//! Shared board state and the virtual-time scheduler.

use std::sync::{Arc, Mutex, MutexGuard};

use pulse_core::{Millis, OutputLineId, TickRate, Ticks, DEFAULT_OUTPUT_LINE};
use pulse_hal::{ChannelId, EventSource, HalError, Level, TaskSink};
use thiserror::Error;

use crate::compare::SimCompare;
use crate::fabric::SimFabric;
use crate::gpio::SimLine;
use crate::timer::{SimSource, SimTerminator};

/// Errors raised by the simulated board itself.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    #[error("no free channel")]
    NoFreeChannel,
    #[error("channel {0} was not allocated")]
    UnknownChannel(u8),
    #[error("peripheral busy")]
    Busy,
}

impl From<SimError> for HalError {
    fn from(value: SimError) -> Self {
        match value {
            SimError::NoFreeChannel => HalError::NoFreeChannel,
            SimError::UnknownChannel(_) => HalError::InvalidChannel,
            SimError::Busy => HalError::Busy,
        }
    }
}

/// Sizing and timing of the simulated board.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub fabric_channels: u8,
    pub compare_channels: u8,
    pub tick_rate: TickRate,
    pub irq_latency: u64,
    pub line: OutputLineId,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fabric_channels: 8,
            compare_channels: 4,
            tick_rate: TickRate::MHZ_1,
            irq_latency: 0,
            line: DEFAULT_OUTPUT_LINE,
        }
    }
}

impl SimConfig {
    pub fn fabric_channels(mut self, count: u8) -> Self {
        self.fabric_channels = count;
        self
    }

    pub fn compare_channels(mut self, count: u8) -> Self {
        self.compare_channels = count;
        self
    }

    pub fn tick_rate(mut self, rate: TickRate) -> Self {
        self.tick_rate = rate;
        self
    }

    /// Ticks between a hardware interrupt request and its handler running.
    pub fn irq_latency(mut self, ticks: u64) -> Self {
        self.irq_latency = ticks;
        self
    }

    pub fn line(mut self, line: OutputLineId) -> Self {
        self.line = line;
        self
    }
}

/// Interrupt lines the board can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Counting terminator reached its preload
    Terminator,
    /// Compare channel with the given index matched
    Compare(u8),
}

/// How the output line changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOpKind {
    /// Flip, from the CPU or from the fabric toggle task
    Toggle,
    /// Level written by the CPU
    Write,
    /// Cleared by the fabric clear task
    Clear,
}

/// One recorded operation on the output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOp {
    pub at: Ticks,
    pub kind: LineOpKind,
    pub level: Level,
}

/// One recorded fabric register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FabricOp {
    Allocate(ChannelId),
    Free(ChannelId),
    Publish(ChannelId, EventSource),
    Unpublish(ChannelId, EventSource),
    Subscribe(ChannelId, TaskSink),
    Unsubscribe(ChannelId, TaskSink),
    Enable(ChannelId),
    Disable(ChannelId),
}

impl FabricOp {
    pub fn channel(&self) -> ChannelId {
        match *self {
            FabricOp::Allocate(ch)
            | FabricOp::Free(ch)
            | FabricOp::Publish(ch, _)
            | FabricOp::Unpublish(ch, _)
            | FabricOp::Subscribe(ch, _)
            | FabricOp::Unsubscribe(ch, _)
            | FabricOp::Enable(ch)
            | FabricOp::Disable(ch) => ch,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ChannelState {
    pub allocated: bool,
    pub events: Vec<EventSource>,
    pub tasks: Vec<TaskSink>,
    pub enabled: bool,
    pub severed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SourceState {
    pub interval: u64,
    pub running: bool,
    pub next: Option<Ticks>,
}

#[derive(Debug, Default)]
pub(crate) struct TerminatorState {
    pub target: u32,
    pub count: u32,
    pub running: bool,
    pub irq_enabled: bool,
    pub reached: bool,
}

#[derive(Debug, Default)]
pub(crate) struct CompareSlot {
    pub taken: bool,
    pub deadline: Option<Ticks>,
    pub history: Vec<Ticks>,
}

#[derive(Debug, Clone, Copy)]
struct PendingIrq {
    at: Ticks,
    irq: Interrupt,
}

enum Occurrence {
    SourceTick,
    CompareMatch(usize),
    Irq(usize),
}

pub(crate) struct BoardState {
    pub cfg: SimConfig,
    pub now: Ticks,
    pub level: Level,
    pub line_ops: Vec<LineOp>,
    pub channels: Vec<ChannelState>,
    pub fabric_log: Vec<FabricOp>,
    pub source: SourceState,
    pub terminator: TerminatorState,
    pub compares: Vec<CompareSlot>,
    irqs: Vec<PendingIrq>,
}

impl BoardState {
    fn new(cfg: SimConfig) -> Self {
        Self {
            cfg,
            now: Ticks::ZERO,
            level: Level::Low,
            line_ops: Vec::new(),
            channels: (0..cfg.fabric_channels)
                .map(|_| ChannelState::default())
                .collect(),
            fabric_log: Vec::new(),
            source: SourceState::default(),
            terminator: TerminatorState::default(),
            compares: (0..cfg.compare_channels)
                .map(|_| CompareSlot::default())
                .collect(),
            irqs: Vec::new(),
        }
    }

    pub fn channel_mut(&mut self, channel: ChannelId) -> Result<&mut ChannelState, SimError> {
        self.channels
            .get_mut(channel.raw() as usize)
            .filter(|state| state.allocated)
            .ok_or(SimError::UnknownChannel(channel.raw()))
    }

    pub fn write_line(&mut self, level: Level, kind: LineOpKind) {
        self.level = level;
        self.line_ops.push(LineOp {
            at: self.now,
            kind,
            level,
        });
    }

    pub fn raise(&mut self, irq: Interrupt) {
        let at = self.now.offset(self.cfg.irq_latency);
        self.irqs.push(PendingIrq { at, irq });
    }

    pub fn purge(&mut self, irq: Interrupt) {
        self.irqs.retain(|pending| pending.irq != irq);
    }

    /// Deliver `event` to every task of every enabled channel it is published into.
    pub fn publish_event(&mut self, event: EventSource) {
        let tasks: Vec<TaskSink> = self
            .channels
            .iter()
            .filter(|ch| ch.enabled && !ch.severed && ch.events.contains(&event))
            .flat_map(|ch| ch.tasks.iter().copied())
            .collect();
        log::trace!("sim {}: {:?} -> {:?}", self.now, event, tasks);
        for task in tasks {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: TaskSink) {
        match task {
            TaskSink::ToggleOutput => {
                let next = self.level.flipped();
                self.write_line(next, LineOpKind::Toggle);
            }
            TaskSink::ClearOutput => self.write_line(Level::Low, LineOpKind::Clear),
            TaskSink::CountTick => {
                if !self.terminator.running {
                    return;
                }
                self.terminator.count = self.terminator.count.wrapping_add(1);
                if self.terminator.target != 0 && self.terminator.count == self.terminator.target {
                    self.terminator.reached = true;
                    if self.terminator.irq_enabled {
                        self.raise(Interrupt::Terminator);
                    }
                    self.publish_event(EventSource::TerminatorReached);
                }
            }
            TaskSink::StopSource => {
                self.source.running = false;
                self.source.next = None;
            }
            TaskSink::StopTerminator => self.terminator.running = false,
        }
    }

    fn next_occurrence(&self) -> Option<(Ticks, u8, Occurrence)> {
        let mut best: Option<(Ticks, u8, Occurrence)> = None;
        let mut consider = |at: Ticks, rank: u8, occ: Occurrence| {
            let earlier = match &best {
                None => true,
                Some((t, r, _)) => (at, rank) < (*t, *r),
            };
            if earlier {
                best = Some((at, rank, occ));
            }
        };

        if let Some(next) = self.source.next {
            consider(next, 0, Occurrence::SourceTick);
        }
        for (index, slot) in self.compares.iter().enumerate() {
            if let Some(deadline) = slot.deadline {
                consider(deadline.max(self.now), 1, Occurrence::CompareMatch(index));
            }
        }
        for (index, pending) in self.irqs.iter().enumerate() {
            consider(pending.at.max(self.now), 2, Occurrence::Irq(index));
        }
        best
    }
}

/// Handle to the simulated board; clones share the same hardware.
#[derive(Clone)]
pub struct SimBoard {
    state: Arc<Mutex<BoardState>>,
}

impl SimBoard {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState::new(cfg))),
        }
    }

    /// # Panics
    ///
    /// Panics if a previous user panicked while holding the board.
    pub(crate) fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().expect("sim board poisoned")
    }

    pub fn config(&self) -> SimConfig {
        self.lock().cfg
    }

    pub fn fabric(&self) -> SimFabric {
        SimFabric::new(self.clone())
    }

    pub fn periodic_source(&self) -> SimSource {
        SimSource::new(self.clone())
    }

    pub fn terminator(&self) -> SimTerminator {
        SimTerminator::new(self.clone())
    }

    pub fn output_line(&self) -> SimLine {
        SimLine::new(self.clone())
    }

    /// Allocate the next free compare channel.
    pub fn take_compare(&self) -> Result<SimCompare, SimError> {
        let mut state = self.lock();
        let index = state
            .compares
            .iter()
            .position(|slot| !slot.taken)
            .ok_or(SimError::NoFreeChannel)?;
        state.compares[index].taken = true;
        drop(state);
        Ok(SimCompare::new(self.clone(), index))
    }

    /// Current virtual counter value.
    pub fn now(&self) -> Ticks {
        self.lock().now
    }

    /// Counter value `millis` after zero.
    pub fn ms(&self, millis: u32) -> Ticks {
        Ticks::new(self.lock().cfg.tick_rate.ticks_for(Millis::from_millis(millis)))
    }

    /// Replay every hardware occurrence up to and including `until`.
    ///
    /// Interrupts are handed to `isr` with the board unlocked, so the handler
    /// may call back into any peripheral. The clock rests at `until` on
    /// return.
    pub fn run_until<F: FnMut(Interrupt)>(&self, until: Ticks, mut isr: F) {
        loop {
            let mut state = self.lock();
            let Some((at, _, occurrence)) = state.next_occurrence() else {
                break;
            };
            if at > until {
                break;
            }
            state.now = at;
            match occurrence {
                Occurrence::SourceTick => {
                    let interval = state.source.interval;
                    state.source.next = Some(at.offset(interval));
                    state.publish_event(EventSource::SourceTick);
                }
                Occurrence::CompareMatch(index) => {
                    state.compares[index].deadline = None;
                    state.raise(Interrupt::Compare(index as u8));
                }
                Occurrence::Irq(index) => {
                    let pending = state.irqs.remove(index);
                    drop(state);
                    isr(pending.irq);
                }
            }
        }

        let mut state = self.lock();
        if until > state.now {
            state.now = until;
        }
    }

    /// Run for `ticks` past the current time.
    pub fn run_for<F: FnMut(Interrupt)>(&self, ticks: u64, isr: F) {
        let until = self.now().offset(ticks);
        self.run_until(until, isr);
    }

    /// Make `channel` silently drop every event published into it.
    pub fn sever_channel(&self, channel: ChannelId) {
        if let Some(state) = self.lock().channels.get_mut(channel.raw() as usize) {
            state.severed = true;
        }
    }

    pub fn line_level(&self) -> Level {
        self.lock().level
    }

    pub fn line_ops(&self) -> Vec<LineOp> {
        self.lock().line_ops.clone()
    }

    /// Timestamps of every toggle, from the CPU or the fabric.
    pub fn toggle_times(&self) -> Vec<Ticks> {
        self.lock()
            .line_ops
            .iter()
            .filter(|op| op.kind == LineOpKind::Toggle)
            .map(|op| op.at)
            .collect()
    }

    /// Toggle timestamps converted to milliseconds.
    pub fn toggle_times_ms(&self) -> Vec<u64> {
        let rate = self.lock().cfg.tick_rate;
        self.toggle_times()
            .into_iter()
            .map(|at| rate.millis_for(at.raw()))
            .collect()
    }

    pub fn fabric_log(&self) -> Vec<FabricOp> {
        self.lock().fabric_log.clone()
    }

    pub fn clear_fabric_log(&self) {
        self.lock().fabric_log.clear();
    }

    /// Number of channels whose enable bit is set.
    pub fn enabled_channels(&self) -> usize {
        self.lock().channels.iter().filter(|ch| ch.enabled).count()
    }

    /// Number of channels with any event or task still linked.
    pub fn linked_channels(&self) -> usize {
        self.lock()
            .channels
            .iter()
            .filter(|ch| !ch.events.is_empty() || !ch.tasks.is_empty())
            .count()
    }

    pub fn source_running(&self) -> bool {
        self.lock().source.running
    }

    pub fn terminator_running(&self) -> bool {
        self.lock().terminator.running
    }

    /// Every deadline ever programmed into compare channel `index`.
    pub fn compare_history(&self, index: usize) -> Vec<Ticks> {
        self.lock()
            .compares
            .get(index)
            .map(|slot| slot.history.clone())
            .unwrap_or_default()
    }

    /// Interrupts raised but not yet delivered.
    pub fn pending_interrupts(&self) -> Vec<Interrupt> {
        self.lock().irqs.iter().map(|pending| pending.irq).collect()
    }
}
