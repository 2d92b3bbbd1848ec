// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the service.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .port(args.port)
        .demo_accounts(args.demo_accounts)
        .build()?;

    let (level, format) = cli.logging(&runtime.config().logging);
    init_logging(&level, format);

    runtime.run().await
}
