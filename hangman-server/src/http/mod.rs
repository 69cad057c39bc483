use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::Config;

pub mod connection;
pub mod handlers;
pub mod request;
pub mod response;

pub use connection::{ConnectionId, ConnectionManager};
use handlers::RequestHandler;
use request::{ParseError, parse_request, read_request};
use response::Response;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed request: {0}")]
    Parse(#[from] ParseError),
    #[error("Timed out while {0}")]
    Timeout(&'static str),
    #[error("Peer closed the connection before sending a request")]
    Closed,
}

/// Serves exactly one request on `stream`, then closes it. Errors end this
/// connection only. The exchange runs in its own task, so the connection is
/// deregistered even if serving it panics.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: Option<SocketAddr>,
    config: Arc<Config>,
    handler: RequestHandler,
    connection_manager: Arc<ConnectionManager>,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let connection_id = connection_manager.create_connection(peer).await;
    let span = info_span!("connection", id = %connection_id, peer = ?peer);

    let exchange = tokio::spawn(
        async move {
            debug!("Accepted connection");
            match serve(&mut stream, &config, &handler).await {
                Ok(()) => {}
                Err(ConnectionError::Closed) => debug!("Peer sent nothing"),
                Err(e) => warn!("Connection failed: {}", e),
            }

            if let Err(e) = stream.shutdown().await {
                debug!("Shutdown failed: {}", e);
            }
        }
        .instrument(span),
    );

    if let Err(e) = exchange.await {
        error!("Connection {} aborted: {}", connection_id, e);
    }

    if let Some(connection) = connection_manager.remove_connection(connection_id).await {
        debug!(
            "Connection {} closed after {:?}",
            connection_id,
            connection.age()
        );
    }
}

async fn serve<S>(
    stream: &mut S,
    config: &Config,
    handler: &RequestHandler,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let raw = timeout(
        config.read_timeout(),
        read_request(stream, config.max_request_bytes),
    )
    .await
    .map_err(|_| ConnectionError::Timeout("reading the request"))?;

    let response = match raw.and_then(|bytes| parse_request(&bytes).map_err(ConnectionError::from)) {
        Ok(request) => {
            info!("{:?} /{}", request.method, request.path);
            handler.handle(request).await
        }
        Err(ConnectionError::Parse(e)) => {
            warn!("Rejecting request: {}", e);
            handlers::not_found()
        }
        Err(e) => return Err(e),
    };

    write_response(stream, &response, config).await
}

async fn write_response<S>(
    stream: &mut S,
    response: &Response,
    config: &Config,
) -> Result<(), ConnectionError>
where
    S: AsyncWrite + Unpin,
{
    let bytes = response.to_bytes();
    timeout(config.write_timeout(), async {
        stream.write_all(&bytes).await?;
        stream.flush().await
    })
    .await
    .map_err(|_| ConnectionError::Timeout("writing the response"))??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::UserDirectory;
    use crate::game_manager::GameManager;
    use hangman_core::WordList;
    use tokio::io::{AsyncReadExt, duplex};

    fn fixtures(root: &std::path::Path) -> (Arc<Config>, RequestHandler) {
        let config = Arc::new(Config {
            document_root: root.to_path_buf(),
            ..Config::default()
        });
        let game_manager = Arc::new(GameManager::new(
            Arc::new(UserDirectory::with_seed_users(1)),
            Arc::new(WordList::from_word_list("testing")),
        ));
        (config.clone(), RequestHandler::new(config, game_manager))
    }

    async fn exchange(root: &std::path::Path, request: &[u8]) -> String {
        let (config, handler) = fixtures(root);
        let manager = Arc::new(ConnectionManager::new());
        let (mut client, server) = duplex(64 * 1024);

        client.write_all(request).await.unwrap();
        handle_connection(server, None, config, handler, manager.clone()).await;
        assert_eq!(manager.connection_count().await, 0);

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_one_request() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("notes.txt"), "hello").unwrap();

        let response = exchange(root.path(), b"GET /notes.txt HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Server: Hangman\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.ends_with("\r\n\r\nhello"));
    }

    #[tokio::test]
    async fn test_malformed_request_gets_not_found() {
        let root = tempfile::tempdir().unwrap();
        let response = exchange(
            root.path(),
            b"POST / HTTP/1.1\r\nContent-Length: nope\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.contains("404: Page Not Found :("));
    }

    #[tokio::test]
    async fn test_oversized_content_length_gets_not_found() {
        let root = tempfile::tempdir().unwrap();
        let response = exchange(
            root.path(),
            b"POST / HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_post_without_content_length_keeps_body() {
        let root = tempfile::tempdir().unwrap();
        let response = exchange(
            root.path(),
            b"POST / HTTP/1.1\r\nHost: x\r\n\r\ncurrentUser=%24%24%24&uname=admin&psw=password",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Logged in as: <b>admin</b>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_timeout_closes_connection() {
        let root = tempfile::tempdir().unwrap();
        let (config, handler) = fixtures(root.path());
        let manager = Arc::new(ConnectionManager::new());
        let (mut client, server) = duplex(1024);

        client.write_all(b"GET /slow").await.unwrap();
        handle_connection(server, None, config, handler, manager.clone()).await;

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
        assert_eq!(manager.connection_count().await, 0);
    }
}
