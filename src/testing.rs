//! Stand-in for the Storywrangler API in tests

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

/// HTTP server that answers a single request with a canned response
pub struct MockApi {
    /// Base URL of the ngram API on this server
    pub api_url: String,

    /// Request head, as received by the server
    request: JoinHandle<String>,
}
//
impl MockApi {
    /// Wait for the request to have been answered, return its head
    pub async fn request(self) -> String {
        self.request.await.expect("mock server should not panic")
    }
}

/// Start a server that answers one request with the given status and body
pub async fn serve_once(status: &'static str, body: &'static str) -> MockApi {
    serve_raw(format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    ))
    .await
}

/// Start a server that answers one request with the given raw HTTP response,
/// then closes the connection
pub async fn serve_raw(response: impl Into<String>) -> MockApi {
    let response = response.into();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should be able to bind a local port");
    let addr = listener.local_addr().expect("bound socket has an address");
    let request = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("client should connect");

        // Read the request head, we never expect a body
        let mut head = Vec::new();
        let mut buf = [0; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let len = socket.read(&mut buf).await.expect("request should be readable");
            if len == 0 {
                break;
            }
            head.extend_from_slice(&buf[..len]);
        }

        // Send the canned response
        socket
            .write_all(response.as_bytes())
            .await
            .expect("response should be writable");
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&head).into_owned()
    });
    MockApi {
        api_url: format!("http://{addr}/api/ngrams"),
        request,
    }
}

/// Base URL of an API that refuses connections
pub async fn unreachable_api_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should be able to bind a local port");
    let addr = listener.local_addr().expect("bound socket has an address");
    drop(listener);
    format!("http://{addr}/api/ngrams")
}
