use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use pulse_core::{CycleAnchor, Millis, PulseTrainConfig};
use pulse_port_sim::SimConfig;

mod scenario;

use scenario::{Report, Scenario, ScenarioFile};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    /// Periodic source wired to the line through the event fabric
    Chained,
    /// One compare channel reprogrammed from its own interrupt
    Rescheduled,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    TrainEnd,
    CycleStart,
}

impl From<Anchor> for CycleAnchor {
    fn from(value: Anchor) -> Self {
        match value {
            Anchor::TrainEnd => CycleAnchor::TrainEnd,
            Anchor::CycleStart => CycleAnchor::CycleStart,
        }
    }
}

/// Pulse-train sequencer on a simulated board
#[derive(Parser, Debug)]
#[command(name = "pulsesim", version, author, long_about = None)]
struct Args {
    /// Engine realizing the train
    #[arg(long, value_enum, default_value_t = Variant::Chained)]
    variant: Variant,

    /// TOML scenario file; flags override its fields
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Toggles per train
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Milliseconds between toggles
    #[arg(long = "toggle-ms")]
    toggle_ms: Option<u32>,

    /// Milliseconds between trains (0 = single-shot)
    #[arg(long = "cycle-ms")]
    cycle_ms: Option<u32>,

    /// What the cycle period is measured from
    #[arg(long, value_enum)]
    anchor: Option<Anchor>,

    /// Trigger time in milliseconds (repeatable)
    #[arg(long = "trigger-at", value_name = "MS")]
    trigger_at: Vec<u32>,

    /// Stop time in milliseconds (repeatable)
    #[arg(long = "stop-at", value_name = "MS")]
    stop_at: Vec<u32>,

    /// End of the simulation in milliseconds
    #[arg(long = "until-ms")]
    until_ms: Option<u32>,

    /// Interrupt latency in microseconds
    #[arg(long = "irq-latency-us")]
    irq_latency_us: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn scenario(&self) -> anyhow::Result<Scenario> {
        let file = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                toml::from_str::<ScenarioFile>(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => ScenarioFile::default(),
        };

        let train = file.train;
        let train = PulseTrainConfig::builder(train.output_line())
            .toggle_count(self.count.unwrap_or(train.toggle_count()))
            .toggle_interval(
                self.toggle_ms
                    .map(Millis::from_millis)
                    .unwrap_or(train.toggle_interval()),
            )
            .cycle_interval(
                self.cycle_ms
                    .map(Millis::from_millis)
                    .unwrap_or(train.cycle_interval()),
            )
            .cycle_anchor(self.anchor.map(Into::into).unwrap_or(train.cycle_anchor()))
            .build()
            .context("invalid pulse train")?;

        let mut board = SimConfig::default().line(train.output_line());
        if let Some(latency) = self.irq_latency_us.or(file.board.irq_latency_us) {
            board = board.irq_latency(latency * u64::from(board.tick_rate.hz()) / 1_000_000);
        }
        if let Some(channels) = file.board.fabric_channels {
            board = board.fabric_channels(channels);
        }

        let triggers = if self.trigger_at.is_empty() {
            file.trigger_at
        } else {
            self.trigger_at.clone()
        };
        let stops = if self.stop_at.is_empty() {
            file.stop_at
        } else {
            self.stop_at.clone()
        };

        Ok(Scenario {
            train,
            board,
            triggers: if triggers.is_empty() { vec![0] } else { triggers },
            stops,
            until_ms: self.until_ms.or(file.until_ms),
        })
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let scenario = args.scenario()?;
    debug!("{:?}", scenario);
    info!(
        "{:?} engine: {} toggles every {}, cycle {}, on {}",
        args.variant,
        scenario.train.toggle_count(),
        scenario.train.toggle_interval(),
        scenario.train.cycle_interval(),
        scenario.train.output_line()
    );

    let report = match args.variant {
        Variant::Chained => scenario.run_chained()?,
        Variant::Rescheduled => scenario.run_rescheduled()?,
    };
    print_report(&report);
    Ok(())
}

fn print_report(report: &Report) {
    println!("{:>12}  {:<6}  level", "time (ms)", "op");
    for entry in &report.timeline {
        println!(
            "{:>12.3}  {:<6}  {:?}",
            entry.at_ms, entry.kind, entry.level
        );
    }
    println!();
    println!("toggles:   {}", report.toggles);
    println!("armed:     {}", report.armed);
    println!("completed: {}", report.completed);
    println!("state:     {}", report.state);
    println!("line:      {:?}", report.level);
    for err in &report.errors {
        println!("error:     {}", err);
    }
}
