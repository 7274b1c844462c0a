//! Open Route Cache test harness.
//!
//! ```bash
//! orc-harness --selftest
//! RUST_LOG=debug orc-harness --selftest
//! ```

use std::io;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use orc_harness::SelfTestSuite;

/// Open Route Cache Test Harness
#[derive(Parser, Debug)]
#[command(name = "orc-harness", version, about)]
struct Args {
    /// Force test harness selftest
    #[arg(long)]
    selftest: bool,

    /// IP CIDR prefix for dummy addresses
    #[arg(long, default_value = "10.234")]
    prefix: String,
}

/// Name of the user running the harness, from the environment.
fn current_user() -> String {
    ["USER", "LOGNAME", "USERNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    // Interface addressing is not wired up yet; the prefix is only recorded
    debug!("address prefix: {}", args.prefix);

    let user = current_user();
    let suite = if args.selftest {
        info!("running self-test as '{}'", user);
        SelfTestSuite::standard(user)
    } else {
        SelfTestSuite::empty(move || orc_harness::SwitchBuilder::new().user(user.clone()).spawn())
    };

    let report = suite.run(&mut io::stderr()).await;
    if report.was_successful() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let args = Args::parse_from(["orc-harness"]);
        assert!(!args.selftest);
        assert_eq!(args.prefix, "10.234");
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from(["orc-harness", "--selftest", "--prefix", "10.99"]);
        assert!(args.selftest);
        assert_eq!(args.prefix, "10.99");
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Args::try_parse_from(["orc-harness", "--host", "sbs3"]).is_err());
    }
}
