use anyhow::{anyhow, Result};
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Where log records go for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands: stderr, problems only unless -v is given.
    Terminal,
    /// `update watch --log-file`: a daily-rotated file under the log directory.
    SessionFile(PathBuf),
}

impl LogTarget {
    fn is_session(&self) -> bool {
        matches!(self, LogTarget::SessionFile(_))
    }
}

/// Directives used when RUST_LOG is unset.
///
/// A watch session records update transitions and store writes at info, so the
/// log shows when a version was offered, confirmed or reminded about. HTTP
/// internals stay quiet below -vv.
pub fn filter_directives(verbose_level: u8, quiet: bool, session: bool) -> &'static str {
    match (quiet, verbose_level, session) {
        (true, _, _) => "error",
        (false, 0, false) => "warn",
        (false, 0, true) => "warn,reelbox_core=info,reelbox_sources::release=info,reelbox=info",
        (false, 1, _) => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,rustls=warn",
        (false, _, _) => "trace",
    }
}

/// Splits `logs/reelbox.log` into the directory and the rotation prefix
/// (`reelbox`), so rotated files are named reelbox.2026-01-17 and so on.
pub fn rotation_parts(log_path: &Path) -> Result<(&Path, &str)> {
    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| anyhow!("Log file path has no parent directory"))?;
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid log filename"))?;
    let prefix = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    Ok((dir, prefix))
}

pub fn init_logging(verbose_level: u8, quiet: bool, target: LogTarget) -> Result<()> {
    // --quiet wins over RUST_LOG; a scripted run should not be flooded
    let filter = if quiet {
        EnvFilter::new(filter_directives(verbose_level, true, target.is_session()))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(filter_directives(verbose_level, false, target.is_session()))
        })
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    match target {
        LogTarget::SessionFile(log_path) => {
            let (log_dir, prefix) = rotation_parts(&log_path)?;
            std::fs::create_dir_all(log_dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, prefix);

            if json {
                let layer = fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(appender);
                registry.with(layer).init();
            } else {
                let layer = fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(appender);
                registry.with(layer).init();
            }
        }
        LogTarget::Terminal if json => {
            let layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(layer).init();
        }
        LogTarget::Terminal => {
            // Tables and prompts own stdout
            let layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_target(false)
                .with_writer(io::stderr);
            registry.with(layer).init();
        }
    }

    Ok(())
}
