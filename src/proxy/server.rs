//! HTTP front of the quiz proxy.

use std::io;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use super::config::ProxyConfig;
use super::http::{read_request, Method, Response};
use super::upstream::{GoogleSheets, SheetSource};

/// Error type for running the proxy.
#[derive(Debug)]
pub enum ProxyError {
    /// The upstream HTTP client could not be built.
    Client(reqwest::Error),
    /// The listening socket could not be opened.
    Bind(String, io::Error),
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::Client(e) => write!(f, "failed to create HTTP client: {}", e),
            ProxyError::Bind(addr, e) => write!(f, "failed to listen on {}: {}", addr, e),
        }
    }
}

impl std::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProxyError::Client(e) => Some(e),
            ProxyError::Bind(_, e) => Some(e),
        }
    }
}

/// Run the proxy until Ctrl-C.
pub async fn run(config: ProxyConfig) -> Result<(), ProxyError> {
    let source = GoogleSheets::new(
        &config.base_url,
        &config.sheet_id,
        &config.range,
        &config.api_key,
        config.row_policy(),
    )
    .map_err(ProxyError::Client)?;

    let listener = TcpListener::bind(&config.addr)
        .await
        .map_err(|e| ProxyError::Bind(config.addr.clone(), e))?;
    info!("Quiz proxy listening on {} (upstream {})", config.addr, source.url());

    tokio::select! {
        _ = serve(listener, Arc::new(source)) => {}
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

/// Accept connections forever, one task per connection.
pub async fn serve<S>(listener: TcpListener, source: Arc<S>)
where
    S: SheetSource + Send + Sync + 'static,
{
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let source = Arc::clone(&source);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, source.as_ref()).await {
                        debug!("Connection from {} failed: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_connection<S: SheetSource>(mut stream: TcpStream, source: &S) -> io::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);

    let response = match read_request(&mut reader).await? {
        Some(request) => {
            debug!("{:?} {}", request.method, request.path);
            handle_request(&request.method, source).await
        }
        None => Response::text(400, "Bad Request"),
    };

    writer.write_all(&response.to_bytes()).await?;
    writer.shutdown().await
}

/// Route a request. The path is not looked at: every path serves the quiz.
pub async fn handle_request<S: SheetSource>(method: &Method, source: &S) -> Response {
    match method {
        Method::Options => Response::text(200, "OK"),
        Method::Get => match source.fetch_quiz().await {
            Ok(items) => match serde_json::to_string(&items) {
                Ok(body) => Response::json(body),
                Err(e) => Response::text(500, format!("Error fetching data: {}", e)),
            },
            Err(e) => {
                error!("Upstream fetch failed: {}", e);
                Response::text(500, format!("Error fetching data: {}", e))
            }
        },
        Method::Other(_) => Response::text(405, "Method Not Allowed"),
    }
}
