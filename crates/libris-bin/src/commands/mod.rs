// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod hash_password;
mod run;
mod validate;
mod version;

pub use hash_password::hash_password;
pub use run::run;
pub use validate::validate;
pub use version::version;

use libris_config::LoggingConfig;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;
use crate::logging::init_logging;

/// Executes the appropriate command based on CLI arguments.
///
/// `run` initializes logging itself once the config file is loaded; the
/// other commands log with the CLI flags over the default settings.
pub async fn execute(cli: Cli) -> BinResult<()> {
    let command = cli.effective_command();
    if !matches!(command, Commands::Run(_)) {
        let (level, format) = cli.logging(&LoggingConfig::default());
        init_logging(&level, format);
    }

    match command {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::HashPassword(args) => hash_password::hash_password(&cli, args),
    }
}
