//! In-process stand-in for the emulator's REST gateway.
//!
//! Each connection carries one request; the reply comes from a caller-supplied
//! closure and every request is recorded for later assertions.

use crate::endpoint::ConnectionTarget;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::debug;

/// One request as the gateway saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method, e.g. `POST`
    pub method: String,
    /// Path after `/v1/`, without the query string
    pub path: String,
    /// Parsed JSON body, `Null` when there was none
    pub body: serde_json::Value,
}

impl RecordedRequest {
    /// Whether the path ends with `suffix`, e.g. `":commit"`
    pub fn is(&self, suffix: &str) -> bool {
        self.path.ends_with(suffix)
    }
}

type Responder = dyn Fn(&RecordedRequest) -> (u16, serde_json::Value) + Send + Sync;

/// A local HTTP server answering with canned JSON
pub struct StubGateway {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl StubGateway {
    /// Bind an ephemeral port and serve `respond` until dropped
    pub async fn start<F>(respond: F) -> std::io::Result<Self>
    where
        F: Fn(&RecordedRequest) -> (u16, serde_json::Value) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let respond = respond.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve(stream, &recorded, respond.as_ref()).await {
                        debug!("stub gateway connection failed: {}", e);
                    }
                });
            }
        });

        Ok(Self {
            addr,
            requests,
            task,
        })
    }

    /// Target pointing every client at this gateway
    pub fn target(&self) -> ConnectionTarget {
        let host = self.addr.to_string();
        ConnectionTarget {
            probe: host.clone(),
            rest_host: host,
        }
    }

    /// Everything received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of requests whose path ends with `suffix`
    pub fn count(&self, suffix: &str) -> usize {
        self.requests().iter().filter(|r| r.is(suffix)).count()
    }
}

impl Drop for StubGateway {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    stream: TcpStream,
    recorded: &Mutex<Vec<RecordedRequest>>,
    respond: &Responder,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default();
    let path = target
        .split('?')
        .next()
        .unwrap_or_default()
        .trim_start_matches("/v1/")
        .to_string();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).await?;
    let request = RecordedRequest {
        method,
        path,
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    };

    let (status, reply) = respond(&request);
    if let Ok(mut all) = recorded.lock() {
        all.push(request);
    }

    let reply = reply.to_string();
    let response = format!(
        "HTTP/1.1 {} Stub\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{}",
        status,
        reply.len(),
        reply
    );
    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
