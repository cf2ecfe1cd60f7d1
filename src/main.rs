// src/main.rs
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use log::{info, warn};

use demi_rs::cli::Args;
use demi_rs::common::{banner, logger, utils, wordlist};
use demi_rs::engine::{CredentialSource, Engine, Pacing, RunConfig};
use demi_rs::output::report;
use demi_rs::probe::{ProbeKind, ProbeOptions, ProbeSpec};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logger::init(args.verbose, args.silent, &args.log_file)
        .context("failed to initialize logging")?;

    if !args.silent {
        banner::show();
    }

    let source = load_credentials(&args)?;
    if source.is_empty() {
        bail!("credential source is empty");
    }

    if args.module == ProbeKind::HttpForm
        && (args.user_field.is_none() || args.pass_field.is_none())
    {
        bail!("http-form requires --user-field and --pass-field");
    }

    let timeout = Duration::from_secs_f64(args.timeout);
    let spec = ProbeSpec {
        kind: args.module,
        options: ProbeOptions {
            timeout,
            port: args.port,
            path: args.path.clone(),
            proxy: args.proxy.clone(),
            method: args.method,
            user_field: args.user_field.clone(),
            pass_field: args.pass_field.clone(),
            success_pattern: args.success_pattern.clone(),
            fail_pattern: args.fail_pattern.clone(),
            forbidden_as_success: args.forbidden_as_success,
        },
    };

    let config = RunConfig {
        target: args.target.clone(),
        max_workers: args.threads,
        timeout,
        stop_on_success: args.stop_on_success,
        pacing: args.random_delay.then(|| Pacing {
            min: Duration::from_secs_f64(args.min_delay),
            max: Duration::from_secs_f64(args.max_delay),
        }),
        result_file: args.result_file.clone(),
    };

    info!(
        "starting attack: target={}, module={}, {} attempts queued",
        args.target,
        args.module,
        source.len()
    );

    let total = source.len() as u64;
    let mut engine = Engine::new(config, source)?;
    if !args.no_progress && !args.silent && !args.verbose {
        engine = engine.with_progress(utils::create_progress_bar(total, "attempts"));
    }

    // Operator interrupt stops the run; in-flight attempts finish on their own.
    let stop = engine.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping workers...");
            stop.trigger();
        }
    });

    let run = engine.run(&spec).await?;

    if run.results.is_empty() {
        println!("\n{}", "[-] No valid credentials found.".yellow());
    } else {
        println!("\n{}", "[+] VALID CREDENTIALS:".bright_green());
        for pair in &run.results {
            println!("  {}", pair.to_string().bright_green());
        }
    }

    if let Some(output) = &args.output {
        report::generate(output, args.output_format, &args.target, args.module, &run)
            .with_context(|| format!("failed to write report to {}", output.display()))?;
        info!("report written to {}", output.display());
    }

    Ok(())
}

fn load_credentials(args: &Args) -> Result<CredentialSource> {
    if let Some(pairs_path) = &args.pairs {
        let pairs = wordlist::read_pairs(pairs_path)
            .with_context(|| format!("failed to read pairs file {}", pairs_path.display()))?;
        return Ok(CredentialSource::Pairs(pairs));
    }

    let users = match &args.userlist {
        Some(path) => wordlist::read_wordlist(path)
            .with_context(|| format!("failed to read user list {}", path.display()))?,
        None => {
            warn!("no user list supplied, using bundled defaults");
            wordlist::default_users()
        }
    };
    let passwords = match &args.passlist {
        Some(path) => wordlist::read_wordlist(path)
            .with_context(|| format!("failed to read password list {}", path.display()))?,
        None => {
            warn!("no password list supplied, using bundled defaults");
            wordlist::default_passwords()
        }
    };

    Ok(CredentialSource::Product { users, passwords })
}
