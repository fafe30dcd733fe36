use archmetrics_api::Server;
use archmetrics_core::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The configured log level is only known after loading, so loading logs
    // through a temporary subscriber.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    let settings = tracing::subscriber::with_default(bootstrap, || Settings::load(None))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(env = %settings.env, "configuration loaded");

    let server = Server::new(settings)?;
    server.run().await
}
