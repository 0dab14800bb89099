use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use solana_sdk::signature::read_keypair_file;
use tracing_subscriber::EnvFilter;

use fair_launch_lottery::commands::{self, LaunchClient};
use fair_launch_lottery::utils::{parse_record_key, FAIR_LAUNCH_PROGRAM};

#[derive(Parser, Debug)]
#[command(name = "fair-launch-lottery", version, about = "Fair-launch lottery reconciliation client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonOpts {
    /// Solana cluster env name (devnet, testnet, mainnet-beta)
    #[arg(short, long, default_value = "devnet")]
    env: String,

    /// RPC URL override
    #[arg(long)]
    rpc: Option<String>,

    /// Path to the wallet keypair (JSON)
    #[arg(short, long)]
    keypair: PathBuf,

    /// Fair launch (sale) record address
    #[arg(short = 'f', long)]
    fair_launch: String,

    /// Fair launch program id
    #[arg(long, default_value = FAIR_LAUNCH_PROGRAM)]
    program_id: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the lottery and write the winner bitmap
    #[command(name = "create_fair_launch_lottery")]
    CreateFairLaunchLottery {
        #[command(flatten)]
        common: CommonOpts,
        /// Seed for a reproducible draw; omit for OS entropy
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Create sequence lookup records left missing by crashed buyers
    #[command(name = "create_missing_sequences")]
    CreateMissingSequences {
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Print the sale record
    #[command(name = "show")]
    Show {
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Print the wallet's ticket for this sale
    #[command(name = "show_ticket")]
    ShowTicket {
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Print per-ticket lottery outcomes from the winner bitmap
    #[command(name = "show_lottery")]
    ShowLottery {
        #[command(flatten)]
        common: CommonOpts,
    },
}

fn cluster_url(env: &str) -> Result<String> {
    Ok(match env {
        "devnet" => "https://api.devnet.solana.com".to_string(),
        "testnet" => "https://api.testnet.solana.com".to_string(),
        "mainnet-beta" => "https://api.mainnet-beta.solana.com".to_string(),
        other => bail!("unknown cluster env {other}"),
    })
}

fn build_client(common: &CommonOpts) -> Result<LaunchClient> {
    let payer = read_keypair_file(&common.keypair)
        .map_err(|e| anyhow!("reading keypair {:?}: {e}", common.keypair))?;
    let url = match &common.rpc {
        Some(url) => url.clone(),
        None => cluster_url(&common.env)?,
    };
    let program_id = parse_record_key(&common.program_id)?;
    Ok(LaunchClient::new(url, payer, program_id))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::CreateFairLaunchLottery { common, seed } => {
            let client = build_client(common)?;
            let fair_launch = parse_record_key(&common.fair_launch)?;
            commands::lottery::create_fair_launch_lottery(&client, &fair_launch, *seed)
        }
        Command::CreateMissingSequences { common } => {
            let client = build_client(common)?;
            let fair_launch = parse_record_key(&common.fair_launch)?;
            commands::sequences::create_missing_sequences(&client, &fair_launch)
        }
        Command::Show { common } => {
            let client = build_client(common)?;
            let fair_launch = parse_record_key(&common.fair_launch)?;
            commands::show::show(&client, &fair_launch)
        }
        Command::ShowTicket { common } => {
            let client = build_client(common)?;
            let fair_launch = parse_record_key(&common.fair_launch)?;
            commands::show::show_ticket(&client, &fair_launch)
        }
        Command::ShowLottery { common } => {
            let client = build_client(common)?;
            let fair_launch = parse_record_key(&common.fair_launch)?;
            commands::show::show_lottery(&client, &fair_launch)
        }
    }
}
