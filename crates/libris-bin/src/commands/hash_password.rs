// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::{self, Read};

use anyhow::Context;
use libris_api::CredentialVerifier;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints an Argon2id PHC string for the given password.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = read_password(&args)?;
    let phc = CredentialVerifier::new().hash(&password)?;
    println!("{}", phc);
    Ok(())
}

fn read_password(args: &HashPasswordArgs) -> BinResult<String> {
    let password = if args.stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read password from stdin")?;
        input.trim_end_matches(['\r', '\n']).to_string()
    } else {
        args.password
            .clone()
            .ok_or_else(|| BinError::usage("No password provided. Use --stdin or pass a value"))?
    };

    if password.is_empty() {
        return Err(BinError::usage("Password must not be empty"));
    }
    Ok(password)
}
