/*!
 * Command implementations
 */

pub mod address;
pub mod ens;
pub mod siwe;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use web3_auth_crypto::SystemClock;
use web3_auth_ens::ReqwestTransport;
use web3_auth_methods::Web3AuthService;
use web3_auth_storage::MemoryStorage;

use crate::config::Config;

/// Service wired with in-process storage and the real HTTP transport
pub type CliService = Web3AuthService<MemoryStorage, ReqwestTransport>;

pub fn build_service(config: &Config) -> Result<CliService> {
    let service = Web3AuthService::new(
        config.service.clone(),
        Arc::new(MemoryStorage::new()),
        Arc::new(ReqwestTransport::new()),
        Arc::new(SystemClock),
    )?;
    Ok(service)
}

/// Read a whole file, or stdin for "-", without altering line endings
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        return Ok(input);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
