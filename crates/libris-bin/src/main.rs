// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Libris service entry point.

use libris_bin::{commands, error::report_error_and_exit, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    if let Err(err) = commands::execute(cli).await {
        report_error_and_exit(err);
    }
}
