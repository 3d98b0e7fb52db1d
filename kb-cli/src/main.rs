#![cfg_attr(coverage, feature(coverage_attribute))]
mod fight;
mod output;
mod pauseresume;
mod roster;

use clap::{
    Parser,
    Subcommand,
    crate_version,
};
use kb_core::errors::*;
use kb_core::logging;
use tracing::*;

#[derive(Parser)]
#[command(
    about = "command-line app for running elimination battles between Kubernetes workloads",
    version,
    propagate_version = true
)]
struct KbCommandRoot {
    #[command(subcommand)]
    subcommand: KbSubcommand,

    #[arg(short, long, global = true, default_value = "info")]
    verbosity: String,
}

#[derive(Subcommand)]
enum KbSubcommand {
    #[command(about = "eliminate workloads one at a time until only one is left", visible_alias = "f")]
    Fight(fight::Args),

    #[command(about = "pause a running battle")]
    Pause(pauseresume::Args),

    #[command(about = "resume a paused battle")]
    Resume(pauseresume::Args),

    #[command(about = "list the combatants in a namespace", visible_aliases = &["ls", "r"])]
    Roster(roster::Args),

    #[command(about = "kubattle version")]
    Version,
}

async fn run(args: KbCommandRoot) -> EmptyResult {
    // Only the subcommands that talk to the cluster build a client, so that `version` works
    // without a kubeconfig
    match &args.subcommand {
        KbSubcommand::Fight(args) => {
            let client = kube::Client::try_default().await?;
            fight::cmd(args, client).await
        },
        KbSubcommand::Pause(args) => {
            let client = kube::Client::try_default().await?;
            pauseresume::pause_cmd(args, client).await
        },
        KbSubcommand::Resume(args) => {
            let client = kube::Client::try_default().await?;
            pauseresume::resume_cmd(args, client).await
        },
        KbSubcommand::Roster(args) => {
            let client = kube::Client::try_default().await?;
            roster::cmd(args, client).await
        },
        KbSubcommand::Version => {
            println!("kubattle {}", crate_version!());
            Ok(())
        },
    }
}

#[tokio::main]
async fn main() {
    let args = KbCommandRoot::parse();
    if args.verbosity.contains("debug") || args.verbosity.contains("trace") {
        logging::setup(&args.verbosity);
    } else {
        logging::setup_for_cli(&args.verbosity);
    }

    if let Err(err) = run(args).await {
        skerr!(err, "kubattle failed");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests;
