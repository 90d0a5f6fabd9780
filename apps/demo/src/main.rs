use actbus::logger::Logger;
use actbus_demo::{app, config};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = config::load_config(path.as_deref())?;

    let _logger = Logger::from_config(env!("CARGO_PKG_NAME"), &config.logger)?;

    let view = app::run(
        config.bus,
        tokio::io::BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    tracing::info!(search = %view.search, count = view.count, "Demo finished");
    Ok(())
}
