// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` completes.
///
/// Accept errors are logged and the loop keeps going. Connections already
/// being served are left to finish on their own tasks.
pub async fn start_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => {
                logger::log_debug("Shutdown requested, no longer accepting connections");
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
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::{Method, Request, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn call(addr: SocketAddr, method: Method, uri: &str, body: &'static str) -> (StatusCode, String) {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::spawn(conn);

        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("host", addr.to_string())
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        let response = sender.send_request(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_serves_over_tcp_until_shutdown() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(Config::default()));

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(start_server_loop(listener, Arc::clone(&state), async {
            let _ = stop_rx.await;
        }));

        let account = r#"{"id":"acc-1","organisation_id":"org-1","type":"accounts"}"#;
        let uri = "/v1/organisation/accounts?account_id=acc-1";

        let (status, body) = call(addr, Method::POST, uri, account).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, account);

        let (status, body) = call(addr, Method::GET, uri, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, account);

        let (status, body) = call(addr, Method::PUT, uri, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, "Method not allowed");

        let (status, _) = call(addr, Method::DELETE, uri, "").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(addr, Method::GET, uri, "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Bad Request");

        stop_tx.send(()).unwrap();
        server.await.unwrap();
        assert_eq!(state.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_connection_limit_rejects_extra_connections() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let mut config = Config::default();
        config.performance.max_connections = Some(0);
        let state = Arc::new(AppState::new(config));

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(start_server_loop(listener, Arc::clone(&state), async {
            let _ = stop_rx.await;
        }));

        let stream = TcpStream::connect(addr).await.unwrap();
        let handshake = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(stream)).await;
        let failed = match handshake {
            Err(_) => true,
            Ok((mut sender, conn)) => {
                tokio::spawn(conn);
                let req = Request::builder()
                    .uri("/v1/organisation/accounts?account_id=a")
                    .header("host", addr.to_string())
                    .body(Full::new(Bytes::new()))
                    .unwrap();
                sender.send_request(req).await.is_err()
            }
        };
        assert!(failed);

        stop_tx.send(()).unwrap();
        server.await.unwrap();
    }
}
