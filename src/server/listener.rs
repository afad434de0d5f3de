use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::http::Handler;
use crate::http::connection::Connection;

pub async fn run(listen_addr: &str, handler: Arc<dyn Handler>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!("Listening on {}", listen_addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let handler = handler.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, handler);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
