// Server loop module
// Accepts connections until a shutdown signal arrives

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::spawn_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` resolves.
///
/// Accept failures are logged and the loop keeps going; no single
/// connection can stop the server.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => spawn_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = &mut shutdown => {
                logger::log_info("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_serves_over_tcp_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hello").unwrap();

        let mut cfg = Config::defaults();
        cfg.logging.access_log = false;
        cfg.performance.keep_alive = false;
        let state = Arc::new(AppState::with_dirs(
            &cfg,
            dir.path().to_path_buf(),
            dir.path().join("images"),
        ));

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    async move {
                        let _ = rx.await;
                    },
                ));

                let mut stream = TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET /hello.txt HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                let mut raw = Vec::new();
                stream.read_to_end(&mut raw).await.unwrap();
                let text = String::from_utf8_lossy(&raw);
                assert!(text.starts_with("HTTP/1.1 200 OK"), "got: {text}");
                assert!(text.ends_with("hello"));

                tx.send(()).unwrap();
                server.await.unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_slow_reader_gets_whole_file() {
        const SIZE: usize = 16 * 1024 * 1024;

        let dir = tempfile::tempdir().unwrap();
        let content: Vec<u8> = (0..SIZE).map(|i| u8::try_from(i % 251).unwrap()).collect();
        std::fs::write(dir.path().join("big.bin"), &content).unwrap();

        let mut cfg = Config::defaults();
        cfg.logging.access_log = false;
        cfg.performance.keep_alive = false;
        cfg.performance.read_timeout = 1;
        let state = Arc::new(AppState::with_dirs(
            &cfg,
            dir.path().to_path_buf(),
            dir.path().join("images"),
        ));

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    async move {
                        let _ = rx.await;
                    },
                ));

                let mut stream = TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET /big.bin HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();

                // stall well past read_timeout while the response is being written
                tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

                let mut raw = Vec::new();
                stream.read_to_end(&mut raw).await.unwrap();
                let head_end = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
                assert!(raw.starts_with(b"HTTP/1.1 200 OK"));
                assert_eq!(raw.len() - head_end, SIZE);
                assert!(raw[head_end..] == content[..]);

                tx.send(()).unwrap();
                server.await.unwrap();
            })
            .await;
    }
}
