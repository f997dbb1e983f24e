/*!
 * ENS commands
 */

use anyhow::Result;
use colored::*;
use web3_auth_crypto::encode_hex_prefixed;
use web3_auth_methods::Web3Auth;

use super::build_service;
use crate::config::Config;

pub fn namehash(name: &str) {
    println!("{}", encode_hex_prefixed(&web3_auth_ens::namehash(name)));
}

fn ensure_providers(config: &Config) -> Result<()> {
    if config.service.rpc.providers.is_empty() {
        anyhow::bail!("RPC_PROVIDERS is not set; ENS lookups need at least one endpoint");
    }
    Ok(())
}

pub async fn resolve(config: &Config, name: &str) -> Result<()> {
    ensure_providers(config)?;
    let service = build_service(config)?;

    match service.resolve_ens_forward(name).await {
        Some(address) => println!("{} -> {}", name.bold(), address.green()),
        None => println!("{} {}", name.bold(), "has no address".yellow()),
    }

    Ok(())
}

pub async fn reverse(config: &Config, address: &str) -> Result<()> {
    ensure_providers(config)?;
    let service = build_service(config)?;

    match service.resolve_ens_reverse(address).await {
        Some(name) => println!("{} -> {}", address.bold(), name.green()),
        None => println!("{} {}", address.bold(), "has no verified primary name".yellow()),
    }

    Ok(())
}
