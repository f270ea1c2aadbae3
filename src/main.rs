/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use newt::{Engine, EngineCommand};
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr so that stdout carries nothing but the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut engine = Engine::new();

    // Each argument is a single command, such as `bench` or "go depth 4", executed before reading stdin
    for arg in std::env::args().skip(1) {
        match arg.parse::<EngineCommand>() {
            Ok(cmd) => engine.send_command(cmd),
            Err(e) => eprintln!("Failed to parse command {arg:?}:\n{e}"),
        }
    }

    engine.run();
}
