//! Serves this peer's board to remote players at `GET /board`.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::board::BoardView;
use crate::config::BOARD_PATH;
use crate::game::SharedGame;

/// Largest request head accepted (8 KiB).
const MAX_REQUEST_SIZE: usize = 8 * 1024;

/// Time a client gets to send its request head.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

pub struct BoardServer {
    listener: TcpListener,
    game: SharedGame,
}

impl BoardServer {
    pub async fn bind<A: ToSocketAddrs>(addr: A, game: SharedGame) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, game })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails, one task per client.
    pub async fn run(self) -> anyhow::Result<()> {
        log::info!("serving board on {}", self.local_addr()?);
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let game = self.game.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, game).await {
                    log::debug!("board request from {} failed: {}", addr, e);
                }
            });
        }
    }
}

async fn handle_connection(mut stream: TcpStream, game: SharedGame) -> anyhow::Result<()> {
    let head = timeout(READ_TIMEOUT, read_request_head(&mut stream))
        .await
        .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", READ_TIMEOUT))??;

    let (status, body) = match parse_request_line(&head) {
        Some(("GET", path)) if path == BOARD_PATH => {
            let board = {
                let game = game
                    .lock()
                    .map_err(|_| anyhow::anyhow!("game state lock poisoned"))?;
                game.render(BoardView::Enemy)
            };
            ("200 OK", board)
        }
        Some(("GET", _)) => ("404 Not Found", "not found\n".to_string()),
        Some(_) => ("405 Method Not Allowed", "method not allowed\n".to_string()),
        None => ("400 Bad Request", "bad request\n".to_string()),
    };
    log::debug!("{} {}", status, head.lines().next().unwrap_or_default());

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Read until the blank line ending the request head.
async fn read_request_head(stream: &mut TcpStream) -> anyhow::Result<String> {
    let mut buf = Vec::with_capacity(512);
    let mut chunk = [0u8; 512];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(anyhow::anyhow!("Connection closed by peer"));
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            buf.truncate(end);
            break;
        }
        if buf.len() > MAX_REQUEST_SIZE {
            return Err(anyhow::anyhow!(
                "Request too large (max: {} bytes)",
                MAX_REQUEST_SIZE
            ));
        }
    }
    String::from_utf8(buf).map_err(|_| anyhow::anyhow!("Request is not UTF-8"))
}

/// Method and path from `GET /board HTTP/1.1`.
fn parse_request_line(head: &str) -> Option<(&str, &str)> {
    let line = head.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let path = parts.next()?;
    let version = parts.next()?;
    if !version.starts_with("HTTP/1.") || parts.next().is_some() {
        return None;
    }
    Some((method, path.split('?').next().unwrap_or(path)))
}
