/*!
 * Web3 Auth CLI
 *
 * Operator tooling for Sign-In with Ethereum deployments:
 * 1. Render a sample challenge a wallet would sign
 * 2. Inspect and recover the signer of a signed message
 * 3. Check EIP-55 address casing and ENS namehashes
 * 4. Resolve ENS names in both directions
 *
 * Configuration comes from the environment (SIWE_DOMAIN, SIWE_NETWORK,
 * RPC_PROVIDERS, ...).
 *
 * Usage:
 *   web3-auth nonce 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266
 *   web3-auth recover message.txt 0x...
 *   RPC_PROVIDERS=https://eth.example web3-auth resolve vitalik.eth
 */

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

#[derive(Parser)]
#[command(name = "web3-auth")]
#[command(about = "Sign-In with Ethereum and ENS operator tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a sample SIWE challenge for an address (preview only, the nonce is not stored)
    Nonce {
        /// Wallet address the challenge is for
        address: String,

        /// URI the user is signing in to
        #[arg(short, long, default_value = "https://localhost/login")]
        uri: String,

        /// Statement shown in the wallet
        #[arg(short, long)]
        statement: Option<String>,
    },
    /// Validate an address and print its EIP-55 form
    Checksum {
        /// Address to check
        address: String,
    },
    /// Print the ENS namehash of a name
    Namehash {
        /// Dotted ENS name
        name: String,
    },
    /// Parse a SIWE message and check its claims
    Inspect {
        /// File containing the message ("-" for stdin)
        file: PathBuf,

        /// Address the client claims to be
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Recover the signer of an EIP-191 message
    Recover {
        /// File containing the signed message ("-" for stdin)
        file: PathBuf,

        /// 65-byte signature in hex
        signature: String,
    },
    /// Resolve an ENS name to an address
    Resolve {
        /// ENS name
        name: String,
    },
    /// Resolve an address to its verified primary ENS name
    Reverse {
        /// Wallet address
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "web3_auth=info,web3_auth_methods=info,web3_auth_ens=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::debug!(
        "Loaded configuration for {} with {} RPC providers",
        config.network,
        config.service.rpc.providers.len()
    );

    match cli.command {
        Commands::Nonce {
            address,
            uri,
            statement,
        } => commands::siwe::sample_challenge(&config, &address, &uri, statement.as_deref())?,

        Commands::Checksum { address } => commands::address::checksum(&address)?,

        Commands::Namehash { name } => commands::ens::namehash(&name),

        Commands::Inspect { file, address } => {
            commands::siwe::inspect(&config, &file, address.as_deref())?
        }

        Commands::Recover { file, signature } => commands::siwe::recover(&file, &signature)?,

        Commands::Resolve { name } => commands::ens::resolve(&config, &name).await?,

        Commands::Reverse { address } => commands::ens::reverse(&config, &address).await?,
    }

    Ok(())
}
