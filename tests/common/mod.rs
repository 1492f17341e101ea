#![allow(dead_code)]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One canned HTTP response from the fake completion API.
pub struct Upstream {
    pub status: &'static str,
    /// Body pieces, written with a short pause between them so the client
    /// sees them as separate chunks
    pub chunks: Vec<String>,
}

impl Upstream {
    pub fn sse(chunks: &[&str]) -> Self {
        Self {
            status: "200 OK",
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn error(status: &'static str, body: &str) -> Self {
        Self {
            status,
            chunks: vec![body.to_string()],
        }
    }
}

/// A recorded request: head (request line + headers) and JSON body.
pub struct Recorded {
    pub head: String,
    pub body: serde_json::Value,
}

/// Builds an SSE `data:` event for a content delta.
pub fn delta(text: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"choices": [{"index": 0, "delta": {"content": text}}]})
    )
}

pub const DONE: &str = "data: [DONE]\n\n";

/// Serves `responses` in order, one per connection, on a random local port.
///
/// Returns the base URL to hand to the builder and a handle that resolves to
/// the requests that were received.
pub async fn spawn_upstream(responses: Vec<Upstream>) -> (String, JoinHandle<Vec<Recorded>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut recorded = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            recorded.push(read_request(&mut socket).await);

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
                response.status
            );
            if socket.write_all(head.as_bytes()).await.is_err() {
                continue;
            }
            for chunk in response.chunks {
                // the client may hang up once it has seen an error event
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    break;
                }
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            let _ = socket.shutdown().await;
        }
        recorded
    });

    (format!("http://{addr}/v1/"), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut tmp).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut tmp).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    let body = serde_json::from_slice(&buf[header_end..header_end + content_length])
        .unwrap_or(serde_json::Value::Null);
    Recorded { head, body }
}
