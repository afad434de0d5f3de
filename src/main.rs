use std::sync::Arc;

use courier::config::Config;
use courier::http::Handler;
use courier::server::listener;
use courier::service::AppRouter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();
    let handler: Arc<dyn Handler> = Arc::new(AppRouter::new());

    tokio::select! {
        res = listener::run(&cfg.server.listen_addr, handler) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
