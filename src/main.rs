use freegames_catalog::config::Config;
use freegames_catalog::global::Global;
use freegames_catalog::catalog;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .parse_lossy(&config.logging.level),
        )
        .init();

    tracing::info!("starting freegames catalog");

    let global = Global::init(config)?;

    tokio::select! {
        r = catalog::run(global.clone()) => {
            if let Err(e) = r {
                tracing::error!("catalog error: {:#}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    Ok(())
}
