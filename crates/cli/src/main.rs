use clap::Parser;
use sigmend::args::{split_at_separator, usage, Cli};
use sigmend::{reconcile, report, RunOptions};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let (head, tail) = split_at_separator(env::args_os().collect());

    // Directory groups are checked before `.env` or any tree is read.
    if let Err(e) = Cli::parse_from(head.clone()).into_invocation(tail.clone()) {
        eprintln!("{}", usage());
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: .env: {}", e);
        }
    }

    // Parsed again so `.env` values reach the `env` fallbacks.
    let invocation = Cli::parse_from(head).into_invocation(tail)?;

    init_tracing(invocation.verbose);

    let summary = reconcile(&RunOptions {
        config: invocation.config,
        decl_dirs: invocation.decl_dirs,
        impl_dirs: invocation.impl_dirs,
        dry_run: invocation.dry_run,
    })?;

    report::write_report(&mut std::io::stderr().lock(), &summary)?;

    if invocation.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
