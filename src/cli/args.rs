//! CLI argument definitions using clap derive

use clap::Parser;
use std::path::PathBuf;

/// Threshold monitor that raises and clears alerts as SNMPv2c traps
///
/// Runs each configured metric command on an interval, compares its output
/// to a threshold and notifies every trap target when a metric crosses it.
#[derive(Parser, Debug)]
#[command(name = "trapmon")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Path to configuration file [default: config.json, then the user and
    /// system config directories]
    #[arg(short, long, env = "TRAPMON_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print log output (level info unless RUST_LOG says otherwise)
    #[arg(short = 'p', long = "print-log")]
    pub print_log: bool,

    /// Print version and build information
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Receive traps on ADDR and print them as JSON lines instead of monitoring
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Only accept received traps carrying this community
    #[arg(long, requires = "listen")]
    pub community: Option<String>,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Version,
    Receive {
        addr: String,
        community: Option<String>,
    },
    Monitor,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.version {
            Mode::Version
        } else if let Some(addr) = &self.listen {
            Mode::Receive {
                addr: addr.clone(),
                community: self.community.clone(),
            }
        } else {
            Mode::Monitor
        }
    }
}
