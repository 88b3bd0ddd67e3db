use anyhow::Context;
use entryd::config::Config;
use entryd::ipc;
use entryd::services::Services;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

async fn write_line(stdout: &mut Stdout, value: &serde_json::Value) -> anyhow::Result<()> {
    let line = serde_json::to_string(value).unwrap_or_else(|_| "{\"ok\":false}".to_string());
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    // stdout carries the protocol; logs go to stderr.
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();

    info!(
        directory = %config.directory_url,
        entries = %config.entries_url,
        "entryd starting"
    );
    let services = Services::from_config(&config).context("failed to set up store client")?;
    let mut state = ipc::AppState::new(config, services);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(v)) => v,
                    Ok(None) | Err(_) => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                let resp = ipc::handle_line(&mut state, &line);
                write_line(&mut stdout, &resp).await?;
            }
            Some(()) = state.next_completion(), if state.has_pending_work() => {}
        }
        for event in state.take_events() {
            write_line(&mut stdout, &event).await?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}
