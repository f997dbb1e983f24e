/*!
 * SIWE commands: sample challenges, inspection and signer recovery
 */

use anyhow::Result;
use colored::*;
use std::path::Path;
use web3_auth_crypto::{current_timestamp, parse_signature_hex, recover_signer, to_checksum_address};
use web3_auth_methods::{generate_nonce, SiweMessage, Web3Auth};

use super::{build_service, read_input};
use crate::config::Config;

/// Print a sample challenge
///
/// The nonce is never stored, so the text cannot be used to sign in.
pub fn sample_challenge(
    config: &Config,
    address: &str,
    uri: &str,
    statement: Option<&str>,
) -> Result<()> {
    let service = build_service(config)?;
    let nonce = generate_nonce();
    let message = service.build_siwe_message(address, &nonce, uri, statement)?;

    println!("{}", "=== SIWE Challenge (sample) ===".bold().cyan());
    println!("  Network: {} (chain {})", config.network, config.network.chain_id());
    println!("  Nonce:   {} {}", nonce.green(), "(not stored)".dimmed());
    println!(
        "  Expires: in {}s",
        config.service.nonce.lifetime_seconds
    );
    println!("\n{}", message);

    Ok(())
}

pub fn inspect(config: &Config, file: &Path, claimed_address: Option<&str>) -> Result<()> {
    let text = read_input(file)?;
    let message = SiweMessage::parse(&text)?;

    println!("{}", "=== SIWE Message ===".bold().cyan());
    println!("  Domain:     {}", message.domain);
    println!("  Address:    {}", message.address);
    if let Some(statement) = &message.statement {
        println!("  Statement:  {}", statement);
    }
    println!("  URI:        {}", message.uri);
    println!("  Version:    {}", message.version);
    match message.chain_id {
        Some(chain_id) => println!("  Chain ID:   {}", chain_id),
        None => println!("  Chain ID:   {}", "(not set)".dimmed()),
    }
    println!("  Nonce:      {}", message.nonce);
    println!("  Issued At:  {}", message.issued_at);
    if let Some(expiration_time) = &message.expiration_time {
        println!("  Expires:    {}", expiration_time);
    }
    if let Some(not_before) = &message.not_before {
        println!("  Not Before: {}", not_before);
    }
    if let Some(request_id) = &message.request_id {
        println!("  Request ID: {}", request_id);
    }
    for resource in &message.resources {
        println!("  Resource:   {}", resource);
    }

    let siwe = &config.service.siwe;
    let claimed = claimed_address.unwrap_or(message.address.as_str());
    let verdict = message.validate_claims(
        claimed,
        &siwe.expected_domain,
        siwe.expected_chain_id,
        current_timestamp(),
        siwe.clock_skew_seconds,
    );

    println!("\n{}", "Claims:".bold());
    match verdict {
        Ok(()) => println!("  {}", "valid for this deployment".green()),
        Err(e) => println!("  {}", e.to_string().red()),
    }

    Ok(())
}

pub fn recover(file: &Path, signature: &str) -> Result<()> {
    let text = read_input(file)?;
    let signature = parse_signature_hex(signature)?;
    let signer = recover_signer(text.as_bytes(), &signature)?;

    println!("{}", to_checksum_address(&signer)?.green());
    if let Some(chain_id) = signature.eip155_chain_id() {
        println!("  {} {}", "EIP-155 chain:".dimmed(), chain_id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_sample_challenge_needs_no_runtime() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert!(sample_challenge(&config, ADDRESS, "https://localhost/login", None).is_ok());
        assert!(sample_challenge(&config, "0x1234", "https://localhost/login", None).is_err());
    }
}
