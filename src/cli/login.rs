use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, DeviceCodeResponse};
use crate::auth::{self, PollObserver};
use crate::cli::{output, util, Env};
use crate::config::Config;

/// Arguments for the `codestash login` subcommand.
#[derive(ClapArgs)]
pub struct Args {}

/// Run the device-authorization grant and store the resulting token.
pub fn run(_args: Args, env: &Env) -> Result<()> {
    let cfg = env.config()?;
    let client = util::client(&cfg)?;
    util::runtime()?.block_on(login(&client, &cfg))
}

async fn login(client: &ApiClient, cfg: &Config) -> Result<()> {
    let device = client
        .start_device_code()
        .await
        .context("failed to request device code")?;

    print_instructions(&device);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut progress = SpinnerProgress::new();
    let result =
        auth::complete_device_flow(client, &device, &cfg.token_path, &mut progress, &cancel).await;
    progress.finish();

    let credential = result?;
    tracing::info!("granted scopes: {:?}", credential.scope);
    output::success(&format!(
        "Login successful! Token saved to {}",
        cfg.token_path.display()
    ));
    Ok(())
}

fn print_instructions(device: &DeviceCodeResponse) {
    output::header("To authorize this CLI:");
    output::info(&format!("1. Open: {}", device.verification_target()));
    output::info(&format!(
        "2. Enter code: {}",
        auth::format_user_code(&device.user_code)
    ));
    eprintln!();
}

/// Spinner that reports how many times the server has been asked.
struct SpinnerProgress {
    bar: indicatif::ProgressBar,
    checks: u32,
}

impl SpinnerProgress {
    fn new() -> Self {
        Self {
            bar: output::spinner("Waiting for authorization..."),
            checks: 0,
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PollObserver for SpinnerProgress {
    fn pending(&mut self) {
        self.checks += 1;
        self.bar.set_message(format!(
            "Waiting for authorization... ({} checks)",
            self.checks
        ));
    }

    fn slowed_down(&mut self, interval: Duration) {
        self.bar.println(format!(
            "Server asked to slow down, next attempt in {}s",
            interval.as_secs()
        ));
    }
}
