//! # vkms-setup
//!
//! Turns on vkms and creates connectors for a test run. The topology is
//! left in place when this exits, with every connector connected, so
//! the tests that follow see a fixed set of displays.
//!
//! * `vkms-setup 3` - three default displays.
//! * `vkms-setup --config DP,2 HDMIA,1` - one display per token.
//! * `vkms-setup --cleanup` - remove whatever an earlier run left behind.

// Austin Shafer - 2025
extern crate utils;
extern crate vkms;

mod args;
use args::Command;

use utils::{log, Context, Result};
use vkms::TopologySession;

fn run(cmd: Command) -> Result<()> {
    let mut session = match cmd {
        Command::Cleanup => {
            let report = TopologySession::force_delete();
            log::info!(
                "Removed {} links and {} directories, {} entries left",
                report.unlinked.len(),
                report.removed.len(),
                report.skipped.len()
            );
            return Ok(());
        }
        Command::Generic(count) => {
            log::info!("Setting up vkms with {} generic connectors", count);
            TopologySession::create_with_generic_connectors(count)
        }
        Command::Config(specs) => {
            log::info!("Setting up vkms with {} custom connectors", specs.len());
            TopologySession::create_with_specs(&specs)
        }
    }
    .context("Failed to set up vkms")?;

    // The next test run depends on this topology
    session.disable_cleanup_on_destruction();

    for i in 0..session.active_connector_count() {
        session
            .toggle_connector(i, true)
            .with_context(|| format!("Failed to enable connector {}", i))?;
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match args::parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("{}", args::USAGE);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cmd) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
