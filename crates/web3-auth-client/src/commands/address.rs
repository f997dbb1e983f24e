/*!
 * Address checksum command
 */

use anyhow::Result;
use colored::*;
use web3_auth_crypto::{checksum_valid, to_checksum_address};

pub fn checksum(address: &str) -> Result<()> {
    let checksummed = to_checksum_address(address)?;

    println!("{}", "=== Address ===".bold().cyan());
    println!("  Input:    {}", address);
    println!("  EIP-55:   {}", checksummed.green());

    if checksum_valid(address) {
        println!("  Casing:   {}", "valid".green());
    } else {
        println!("  Casing:   {}", "checksum mismatch".red());
        anyhow::bail!("{} has an invalid EIP-55 checksum", address);
    }

    Ok(())
}
