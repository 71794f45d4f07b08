use crate::config::ServerConfig;
use anagram_indexer::AnagramIndex;
use anagram_protocol::{normalize_query, read_line_limited, write_response, Framing};
use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpListener;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    pub idle_timeout: Option<Duration>,
    pub max_line_bytes: usize,
    pub framing: Framing,
    pub exclude_query: bool,
}

impl From<&ServerConfig> for ServerOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            idle_timeout: config.idle_timeout(),
            max_line_bytes: config.max_line_bytes,
            framing: config.framing,
            exclude_query: config.exclude_query,
        }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

/// Why a connection stopped being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Client closed its side (or sent a final line without `\n`).
    Eof,
    /// No complete request within the idle timeout.
    IdleTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub requests: usize,
    pub reason: CloseReason,
}

async fn resolve_bind_addrs(bind: &str) -> Result<Vec<SocketAddr>> {
    // Prefer resolving via Tokio so "localhost" behaves as expected.
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(bind)
        .await
        .with_context(|| format!("Failed to resolve bind address: {bind}"))?
        .collect();

    if addrs.is_empty() {
        anyhow::bail!("Bind address resolved to zero socket addrs: {bind}")
    }
    Ok(addrs)
}

fn choose_preferred_bind_addr(addrs: &[SocketAddr]) -> Option<SocketAddr> {
    addrs
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
}

pub async fn bind(bind: &str) -> Result<TcpListener> {
    let addrs = resolve_bind_addrs(bind).await?;
    let addr = choose_preferred_bind_addr(&addrs)
        .with_context(|| format!("No usable bind address for {bind}"))?;
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))
}

/// Accept connections until `shutdown` flips to `true`, one task per connection.
pub async fn serve(
    listener: TcpListener,
    index: Arc<AnagramIndex>,
    options: ServerOptions,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            res = listener.accept() => {
                let (stream, peer) = res.context("accept failed")?;
                log::debug!("client {peer} connected");
                let index = Arc::clone(&index);
                tokio::spawn(async move {
                    match handle_conn(stream, &index, &options).await {
                        Ok(summary) => log::debug!(
                            "client {peer} closed after {} requests ({:?})",
                            summary.requests,
                            summary.reason
                        ),
                        Err(err) => log::debug!("client {peer} dropped: {err:#}"),
                    }
                });
            }
        }
    }
    log::info!("Server stopped accepting connections");
    Ok(())
}

/// Serve one connection: read a word, answer with its class, repeat.
pub async fn handle_conn<S>(
    stream: S,
    index: &AnagramIndex,
    options: &ServerOptions,
) -> Result<ConnectionSummary>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let mut requests = 0usize;

    loop {
        let read = read_line_limited(&mut reader, options.max_line_bytes);
        let line = match options.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, read).await {
                Ok(line) => line?,
                Err(_) => {
                    return Ok(ConnectionSummary {
                        requests,
                        reason: CloseReason::IdleTimeout,
                    })
                }
            },
            None => read.await?,
        };
        let Some(line) = line else {
            return Ok(ConnectionSummary {
                requests,
                reason: CloseReason::Eof,
            });
        };

        requests += 1;
        let query = normalize_query(&line);
        let members = index
            .lookup(&query)
            .iter()
            .map(|word| word.as_ref())
            .filter(|word| !(options.exclude_query && *word == query));
        write_response(&mut write_half, members, options.framing).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anagram_protocol::read_framed_response;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn index() -> AnagramIndex {
        AnagramIndex::from_words([
            "listen", "silent", "enlist", "cat", "act", "dog", "coast", "costa",
        ])
    }

    fn framed() -> ServerOptions {
        ServerOptions {
            idle_timeout: None,
            max_line_bytes: 64,
            framing: Framing::BlankLine,
            exclude_query: false,
        }
    }

    #[tokio::test]
    async fn answers_each_line_in_class_order() {
        let (client, server) = tokio::io::duplex(1024);
        let index = index();
        let options = ServerOptions {
            idle_timeout: None,
            ..ServerOptions::default()
        };
        let handle = tokio::spawn(async move { handle_conn(server, &index, &options).await });

        let (read_half, mut write_half) = tokio::io::split(client);
        write_half.write_all(b"tacos\nzzz\nTinsel\r\n").await.unwrap();
        write_half.shutdown().await.unwrap();

        let mut lines = BufReader::new(read_half).lines();
        let mut received = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            received.push(line);
        }

        assert_eq!(received, vec!["coast", "costa", "listen", "silent", "enlist"]);
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(
            summary,
            ConnectionSummary {
                requests: 3,
                reason: CloseReason::Eof
            }
        );
    }

    #[tokio::test]
    async fn miss_sends_nothing_and_keeps_the_connection() {
        let (client, server) = tokio::io::duplex(1024);
        let index = index();
        let options = framed();
        let handle = tokio::spawn(async move { handle_conn(server, &index, &options).await });

        let (read_half, mut write_half) = tokio::io::split(client);
        let mut reader = BufReader::new(read_half);

        write_half.write_all(b"nothing\n").await.unwrap();
        assert_eq!(
            read_framed_response(&mut reader, 64).await.unwrap(),
            Some(Vec::new())
        );

        write_half.write_all(b"god\n").await.unwrap();
        assert_eq!(
            read_framed_response(&mut reader, 64).await.unwrap(),
            Some(vec!["dog".to_string()])
        );

        write_half.shutdown().await.unwrap();
        assert_eq!(handle.await.unwrap().unwrap().requests, 2);
    }

    #[tokio::test]
    async fn exclude_query_drops_the_word_itself() {
        let (client, server) = tokio::io::duplex(1024);
        let index = index();
        let options = ServerOptions {
            exclude_query: true,
            ..framed()
        };
        let handle = tokio::spawn(async move { handle_conn(server, &index, &options).await });

        let (read_half, mut write_half) = tokio::io::split(client);
        let mut reader = BufReader::new(read_half);
        write_half.write_all(b"coast\n").await.unwrap();
        assert_eq!(
            read_framed_response(&mut reader, 64).await.unwrap(),
            Some(vec!["costa".to_string()])
        );
        write_half.shutdown().await.unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn oversized_line_closes_only_that_connection() {
        let (client, server) = tokio::io::duplex(1024);
        let index = index();
        let options = framed();
        let handle = tokio::spawn(async move { handle_conn(server, &index, &options).await });

        let (_read_half, mut write_half) = tokio::io::split(client);
        write_half.write_all(&[b'a'; 200]).await.unwrap();
        write_half.write_all(b"\n").await.unwrap();

        let err = handle.await.unwrap().expect_err("line too long");
        assert!(err.to_string().contains("exceeds"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn idle_connection_is_cut() {
        let (_client, server) = tokio::io::duplex(64);
        let index = index();
        let options = ServerOptions {
            idle_timeout: Some(Duration::from_millis(50)),
            ..framed()
        };
        let summary = handle_conn(server, &index, &options).await.unwrap();
        assert_eq!(
            summary,
            ConnectionSummary {
                requests: 0,
                reason: CloseReason::IdleTimeout
            }
        );
    }

    #[test]
    fn prefers_ipv4_bind_addrs() {
        let v6: SocketAddr = "[::1]:4567".parse().unwrap();
        let v4: SocketAddr = "127.0.0.1:4567".parse().unwrap();
        assert_eq!(choose_preferred_bind_addr(&[v6, v4]), Some(v4));
        assert_eq!(choose_preferred_bind_addr(&[v6]), Some(v6));
        assert_eq!(choose_preferred_bind_addr(&[]), None);
    }

    #[tokio::test]
    async fn serves_concurrent_clients_until_shutdown() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server = tokio::spawn(serve(listener, Arc::new(index()), framed(), shutdown_rx));

        let mut clients = Vec::new();
        for query in ["tacos", "act", "silent"] {
            clients.push(tokio::spawn(async move {
                let stream = TcpStream::connect(addr).await.unwrap();
                let (read_half, mut write_half) = stream.into_split();
                let mut reader = BufReader::new(read_half);
                write_half
                    .write_all(format!("{query}\n").as_bytes())
                    .await
                    .unwrap();
                read_framed_response(&mut reader, 64).await.unwrap()
            }));
        }

        let mut answers = Vec::new();
        for client in clients {
            answers.push(client.await.unwrap().expect("response"));
        }
        assert_eq!(
            answers,
            vec![
                vec!["coast".to_string(), "costa".to_string()],
                vec!["cat".to_string(), "act".to_string()],
                vec![
                    "listen".to_string(),
                    "silent".to_string(),
                    "enlist".to_string()
                ],
            ]
        );

        shutdown_tx.send(true).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn bind_reports_address_in_use() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap().to_string();
        let err = bind(&addr).await.expect_err("address in use");
        assert!(err.to_string().contains("Failed to bind"), "unexpected error: {err}");
    }
}
