use std::path::PathBuf;

use kb_arena::{
    Battle,
    BattleOutcome,
    BattleReport,
    BattleSettings,
    ClusterAccessor,
    KubeAccessor,
};
use kb_core::clock::UtcClock;
use kb_core::errors::*;
use kb_core::prelude::*;
use tokio::sync::watch;
use tracing::*;

use crate::output::OutputFormat;

#[derive(clap::Args)]
pub struct Args {
    #[arg(short, long, long_help = "namespace to fight in [default: loadbalancer-fight]")]
    pub namespace: Option<String>,

    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        long_help = "seconds to wait between rounds [default: 10]"
    )]
    pub interval: Option<i64>,

    #[arg(
        short,
        long,
        long_help = "how to pick the next victim: random, youngest, oldest, or resource-hog [default: random]"
    )]
    pub strategy: Option<String>,

    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        long_help = "stop after this many rounds; 0 means fight until there's a winner"
    )]
    pub max_rounds: Option<i64>,

    #[arg(long, long_help = "which workloads fight: all, pods, or controllers [default: all]")]
    pub arena: Option<String>,

    #[arg(
        long,
        allow_negative_numbers = true,
        long_help = "give up after this many consecutive failed rounds [default: 3]"
    )]
    pub failure_threshold: Option<i64>,

    #[arg(
        long,
        allow_negative_numbers = true,
        long_help = "seconds between checks while the battle is paused [default: 10]"
    )]
    pub pause_poll_seconds: Option<i64>,

    #[arg(long, long_help = "seed for random victim selection, for repeatable battles")]
    pub seed: Option<u64>,

    #[arg(short, long, long_help = "YAML file with battle settings; command-line flags take precedence")]
    pub config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t)]
    pub output: OutputFormat,
}

impl Args {
    pub fn settings(&self) -> anyhow::Result<BattleSettings> {
        let from_file = match &self.config {
            Some(path) => BattleSettings::load(path)?,
            None => BattleSettings::default(),
        };

        Ok(from_file.overlay(BattleSettings {
            namespace: self.namespace.clone(),
            strategy: self.strategy.clone(),
            arena: self.arena.clone(),
            interval_seconds: self.interval,
            max_rounds: self.max_rounds,
            failure_threshold: self.failure_threshold,
            pause_poll_seconds: self.pause_poll_seconds,
            seed: self.seed,
        }))
    }
}

pub async fn cmd(args: &Args, client: kube::Client) -> EmptyResult {
    let config = args.settings()?.validate()?;
    let accessor = KubeAccessor::new(client, &config.namespace);

    let report = fight(config, Box::new(accessor), UtcClock::boxed(), stop_on_ctrl_c()).await?;
    println!("{}", args.output.render_report(&report)?);

    if let BattleOutcome::Aborted { reason } = &report.outcome {
        bail!("battle aborted: {reason}");
    }
    Ok(())
}

pub(crate) async fn fight(
    config: kb_arena::BattleConfig,
    accessor: Box<dyn ClusterAccessor>,
    clock: Box<dyn Clockable>,
    stop: watch::Receiver<bool>,
) -> anyhow::Result<BattleReport> {
    if !accessor.namespace_exists().await? {
        bail!("namespace not found: {}", config.namespace);
    }

    let mut battle = Battle::new(config, accessor, clock, stop);
    Ok(battle.run().await)
}

fn stop_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; stopping after the current round");
            tx.send_replace(true);
        }
    });
    rx
}
