//! Fetching a peer's rendered board over HTTP.

use std::io::Write;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

use crate::alias::PeerAddress;
use crate::config::{BOARD_PATH, DEFAULT_FETCH_TIMEOUT};

/// Maximum response size accepted from a peer (64 KiB).
const MAX_RESPONSE_SIZE: u64 = 64 * 1024;

/// Message shown to the operator whenever a fetch fails.
pub const FETCH_FAILED: &str = "could not reach peer";

/// Something that can retrieve a remote board rendering.
#[async_trait::async_trait]
pub trait BoardClient: Send + Sync {
    async fn fetch_board(&self, host: &str, port: u16) -> anyhow::Result<String>;
}

/// Single-attempt HTTP client for `GET /board`.
#[derive(Debug, Clone)]
pub struct HttpBoardClient {
    timeout_duration: Duration,
}

impl HttpBoardClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    /// `timeout_duration` bounds the whole request, connect included.
    pub fn with_timeout(timeout_duration: Duration) -> Self {
        Self { timeout_duration }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_duration
    }

    async fn request(&self, host: &str, port: u16) -> anyhow::Result<String> {
        let mut stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| anyhow::anyhow!("Connect error: {}", e))?;

        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}:{}\r\nAccept: text/plain\r\nConnection: close\r\n\r\n",
            BOARD_PATH, host, port
        );
        stream
            .write_all(request.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("Write error: {}", e))?;

        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream
                .read(&mut chunk)
                .await
                .map_err(|e| anyhow::anyhow!("Read error: {}", e))?;
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            if raw.len() as u64 > MAX_RESPONSE_SIZE {
                return Err(anyhow::anyhow!(
                    "Response too large (max: {} bytes)",
                    MAX_RESPONSE_SIZE
                ));
            }
            // A peer may keep the socket open once the declared body is in.
            if expected_size(&raw).is_some_and(|total| raw.len() >= total) {
                break;
            }
        }
        parse_response(&raw)
    }
}

impl Default for HttpBoardClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BoardClient for HttpBoardClient {
    async fn fetch_board(&self, host: &str, port: u16) -> anyhow::Result<String> {
        timeout(self.timeout_duration, self.request(host, port))
            .await
            .map_err(|_| anyhow::anyhow!("Request timeout after {:?}", self.timeout_duration))?
    }
}

/// Total response size announced by the head, once the head is complete and
/// carries a `Content-Length`.
fn expected_size(raw: &[u8]) -> Option<usize> {
    let split = header_end(raw)?;
    let head = std::str::from_utf8(&raw[..split]).ok()?;
    head.split("\r\n").skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.eq_ignore_ascii_case("content-length") {
            value.trim().parse::<usize>().ok().map(|len| split + 4 + len)
        } else {
            None
        }
    })
}

fn header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Extract the body of a `200 OK` response.
fn parse_response(raw: &[u8]) -> anyhow::Result<String> {
    let split = header_end(raw)
        .ok_or_else(|| anyhow::anyhow!("Malformed response: no header terminator"))?;
    let head = std::str::from_utf8(&raw[..split])
        .map_err(|_| anyhow::anyhow!("Malformed response: headers are not UTF-8"))?;
    let mut body = &raw[split + 4..];

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default();
    let mut parts = status_line.split_whitespace();
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(anyhow::anyhow!("Malformed status line: {:?}", status_line));
    }
    let status: u16 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Malformed status line: {:?}", status_line))?;
    if status != 200 {
        return Err(anyhow::anyhow!("Peer answered with status {}", status));
    }

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("transfer-encoding") && !value.eq_ignore_ascii_case("identity") {
            return Err(anyhow::anyhow!("Unsupported transfer encoding: {}", value));
        }
        if name.eq_ignore_ascii_case("content-length") {
            let len: usize = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid content length: {}", value))?;
            if len > body.len() {
                return Err(anyhow::anyhow!(
                    "Truncated body: expected {} bytes, got {}",
                    len,
                    body.len()
                ));
            }
            body = &body[..len];
        }
    }

    String::from_utf8(body.to_vec()).map_err(|_| anyhow::anyhow!("Board is not valid UTF-8"))
}

/// Fetch `peer`'s board and write it to `out` verbatim.
///
/// Any failure is logged and replaced by [`FETCH_FAILED`]; returns whether
/// the board was shown.
pub async fn write_remote_board<W: Write>(
    client: &dyn BoardClient,
    peer: &PeerAddress,
    out: &mut W,
) -> std::io::Result<bool> {
    match client.fetch_board(&peer.host, peer.port).await {
        Ok(board) => {
            writeln!(out, "{}", board)?;
            Ok(true)
        }
        Err(e) => {
            log::warn!("fetching board from {} failed: {}", peer.endpoint(), e);
            writeln!(out, "{}", FETCH_FAILED)?;
            Ok(false)
        }
    }
}

/// Fetch `peer`'s board and print it to stdout.
pub async fn show_remote_board(client: &dyn BoardClient, peer: &PeerAddress) -> bool {
    let mut stdout = std::io::stdout();
    write_remote_board(client, peer, &mut stdout)
        .await
        .unwrap_or(false)
}
