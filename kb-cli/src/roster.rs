use std::fmt::Write;

use kb_arena::{
    Arena,
    ClusterAccessor,
    CombatantKind,
    CombatantMetrics,
    KubeAccessor,
    MetricCollector,
    census,
};
use kb_core::clock::UtcClock;
use kb_core::prelude::*;
use serde::Serialize;

use crate::output::OutputFormat;

#[derive(clap::Args)]
pub struct Args {
    #[arg(short, long, default_value = DEFAULT_NAMESPACE, long_help = "namespace to list combatants in")]
    pub namespace: String,

    #[arg(long, default_value = DEFAULT_ARENA, long_help = "which workloads fight: all, pods, or controllers")]
    pub arena: String,

    #[arg(long, long_help = "include cpu and memory usage from the metrics API")]
    pub usage: bool,

    #[arg(short, long, value_enum, default_value_t)]
    pub output: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RosterEntry {
    pub kind: CombatantKind,
    pub name: String,
    #[serde(flatten)]
    pub metrics: CombatantMetrics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Roster {
    pub namespace: String,
    pub size: u32,
    pub combatants: Vec<RosterEntry>,
}

pub async fn cmd(args: &Args, client: kube::Client) -> EmptyResult {
    let arena = args.arena.parse()?;
    let accessor = KubeAccessor::new(client, &args.namespace);
    let roster = build_roster(&accessor, &UtcClock, &args.namespace, arena, args.usage).await?;
    println!("{}", args.output.render(&roster, Roster::to_text)?);
    Ok(())
}

pub(crate) async fn build_roster(
    accessor: &dyn ClusterAccessor,
    clock: &dyn Clockable,
    namespace: &str,
    arena: Arena,
    usage: bool,
) -> anyhow::Result<Roster> {
    let population = census(accessor, arena).await?;
    let snapshot = MetricCollector::new(accessor, clock).collect(&population, usage).await;

    let combatants = population
        .iter()
        .filter_map(|c| {
            snapshot.get(&c.key()).map(|m| RosterEntry {
                kind: c.kind,
                name: c.name.clone(),
                metrics: m.clone(),
            })
        })
        .collect();

    Ok(Roster {
        namespace: namespace.into(),
        size: population.size(),
        combatants,
    })
}

impl Roster {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<12} {:<40} {:>7} {:>9} {:>7}  USAGE",
            "KIND", "NAME", "READY", "RESTARTS", "AGE"
        );
        for entry in &self.combatants {
            let usage = entry.metrics.usage.map(|u| u.to_string()).unwrap_or_else(|| "-".into());
            let _ = writeln!(
                out,
                "{:<12} {:<40} {:>7} {:>9} {:>7}  {usage}",
                entry.kind.to_string(),
                entry.name,
                entry.metrics.ready,
                entry.metrics.restarts,
                format_age(entry.metrics.age_seconds),
            );
        }
        let _ = write!(out, "{} combatants, {} units in {}", self.combatants.len(), self.size, self.namespace);
        out
    }
}

pub(crate) fn format_age(seconds: i64) -> String {
    match seconds {
        s if s < 120 => format!("{s}s"),
        s if s < 2 * 3600 => format!("{}m", s / 60),
        s if s < 2 * 86400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86400),
    }
}
