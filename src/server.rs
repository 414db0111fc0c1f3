//! Static HTTP server for the rendered output directory

use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Router serving `index.html`, `votes.json` and `archives/` from `output_dir`
pub fn router(output_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(output_dir))
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve `output_dir` in a background task
pub async fn spawn(addr: SocketAddr, output_dir: &Path) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(output_dir);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server stopped: {}", e);
        }
    });

    tracing::info!("Serving vote page on http://{}", local);
    Ok(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_output_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("votes.json"), "[]")
            .await
            .unwrap();

        let addr = spawn("127.0.0.1:0".parse().unwrap(), dir.path())
            .await
            .unwrap();

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /votes.json HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("[]"));
    }
}
