use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{self, Context};
use rdb::{Config, Host, LineDebugger, TraceOutcome, Tracer};
use tracing_subscriber::filter::EnvFilter;

#[derive(Debug, Parser)]
struct Args {
    /// Config file, instead of the one in the user config directory
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(short, long)]
    address: Option<String>,

    #[clap(short, long)]
    port: Option<u16>,

    /// Fail the workload and debug the error instead of stopping halfway
    #[clap(long)]
    post_mortem: bool,

    /// Number of steps the workload runs
    #[clap(short, long, default_value_t = 10)]
    steps: u32,
}

impl Args {
    fn config(&self) -> eyre::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .wrap_err("loading config")?
                .ok_or_else(|| eyre::eyre!("no config file at {}", path.display()))?,
            None => Config::discover().wrap_err("discovering config")?,
        };
        if let Some(address) = &self.address {
            config.listen.address = address.clone();
        }
        if let Some(port) = self.port {
            config.listen.port = port;
        }
        Ok(config)
    }
}

fn step(n: u32, fail_at: Option<u32>) -> eyre::Result<u64> {
    if Some(n) == fail_at {
        let cause = std::io::Error::other("checksum mismatch");
        return Err(cause).wrap_err_with(|| format!("running step {n}"));
    }
    Ok((1..=u64::from(n)).map(|k| k * k).sum())
}

/// Step the workload stops at, never before the first one
fn stop_step(steps: u32) -> u32 {
    (steps / 2).max(1)
}

fn report(outcome: TraceOutcome) {
    match outcome {
        TraceOutcome::Finished(terminator) => tracing::info!(?terminator, "session ended"),
        TraceOutcome::Recurrent => tracing::info!("session already running"),
        TraceOutcome::Aborted => tracing::warn!("session aborted"),
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install().context("installing color_eyre")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config()?;
    tracing::debug!(?config, "starting workload");

    let host = Host::global();
    let tracer = Tracer::from_config(host, &config);
    let halfway = stop_step(args.steps);
    let fail_at = args.post_mortem.then_some(halfway);

    for n in 1..=args.steps {
        let value = match step(n, fail_at) {
            Ok(value) => value,
            Err(e) => {
                let outcome = tracer
                    .post_mortem::<LineDebugger>(&e)
                    .wrap_err("post mortem session")?;
                report(outcome);
                return Err(e);
            }
        };

        // goes to the operator while a session is active
        writeln!(host.console().stdout(), "step {n}: {value}")
            .wrap_err("writing progress")?;

        if n == halfway && fail_at.is_none() {
            let outcome = tracer
                .set_trace::<LineDebugger>()
                .wrap_err("tracing workload")?;
            report(outcome);
        }
    }

    Ok(())
}
