// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One watch session: launch, stream, and report how it ended.

use super::{sleep_until_opt, Internal};
use std::time::Duration;
use tb_adapters::{ObjectReader, StreamEnd, TiltAdapter, WatchProcess};
use tb_core::ResourceRecord;
use tokio::io::AsyncReadExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Bytes of watch stderr kept for the exit log line.
pub(crate) const STDERR_TAIL_BYTES: usize = 4 * 1024;

/// How a session's output stream stopped.
#[derive(Debug)]
pub(crate) enum SessionEnd {
    Stream(StreamEnd),
    /// The child exited but its stdout never closed.
    ForceClosed,
}

impl SessionEnd {
    pub(crate) fn describe(&self) -> String {
        match self {
            SessionEnd::Stream(StreamEnd::Eof) => "end of stream".to_string(),
            SessionEnd::Stream(StreamEnd::ReadError(e)) => format!("read error: {e}"),
            SessionEnd::ForceClosed => "force-closed after exit".to_string(),
        }
    }
}

/// Last bytes written to stderr.
#[derive(Debug, Default)]
pub(crate) struct StderrTail {
    bytes: Vec<u8>,
}

impl StderrTail {
    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
        if self.bytes.len() > STDERR_TAIL_BYTES {
            let excess = self.bytes.len() - STDERR_TAIL_BYTES;
            self.bytes.drain(..excess);
        }
    }

    pub(crate) fn into_string(self) -> String {
        String::from_utf8_lossy(&self.bytes).trim().to_string()
    }
}

pub(crate) struct SessionParams<T> {
    pub adapter: T,
    pub session: u64,
    pub internal_tx: mpsc::UnboundedSender<Internal>,
    pub shutdown_rx: oneshot::Receiver<()>,
    pub safety_net: Duration,
}

/// Run one watch session to completion.
///
/// Decoded records are forwarded in stream order. The session reports
/// exactly one `SpawnFailed` or `WatchEnded`, unless it was shut down, in
/// which case it kills the child and reports nothing.
pub(crate) async fn run_session<T: TiltAdapter>(params: SessionParams<T>) {
    let SessionParams {
        adapter,
        session,
        internal_tx,
        mut shutdown_rx,
        safety_net,
    } = params;

    let spawned = tokio::select! {
        result = adapter.spawn_watch() => result,
        _ = &mut shutdown_rx => return,
    };
    let WatchProcess {
        stdout,
        mut stderr,
        mut child,
    } = match spawned {
        Ok(process) => process,
        Err(error) => {
            let _ = internal_tx.send(Internal::SpawnFailed { session, error });
            return;
        }
    };

    let mut reader = ObjectReader::new(stdout);
    let mut tail = StderrTail::default();
    let mut stderr_open = true;
    let mut stderr_buf = [0u8; 1024];
    let mut exit: Option<Option<i32>> = None;
    let mut force_close_at: Option<Instant> = None;
    let mut decoded: u64 = 0;

    let forced = loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                tracing::debug!(session, "watch session shut down");
                if exit.is_none() {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(session, error = %e, "failed to kill watch process");
                    }
                }
                return;
            }

            object = reader.next_object() => match object {
                Some(text) => match serde_json::from_str::<ResourceRecord>(&text) {
                    Ok(record) => {
                        decoded += 1;
                        if internal_tx.send(Internal::Decoded { session, record }).is_err() {
                            let _ = child.kill().await;
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(session, error = %e, len = text.len(), "skipping undecodable object");
                    }
                },
                None => break false,
            },

            read = stderr.read(&mut stderr_buf), if stderr_open => match read {
                Ok(0) | Err(_) => stderr_open = false,
                Ok(n) => tail.push(&stderr_buf[..n]),
            },

            status = child.wait(), if exit.is_none() => {
                let code = status.unwrap_or_else(|e| {
                    tracing::warn!(session, error = %e, "failed to wait on watch process");
                    None
                });
                tracing::debug!(session, exit_code = ?code, "watch process exited");
                exit = Some(code);
                force_close_at = Some(Instant::now() + safety_net);
            }

            _ = sleep_until_opt(force_close_at) => {
                tracing::warn!(session, "stdout still open after exit, force-closing");
                break true;
            }
        }
    };

    let end = if forced {
        SessionEnd::ForceClosed
    } else {
        SessionEnd::Stream(reader.into_end())
    };

    // `None` when the child had to be killed
    let exit = match exit {
        Some(code) => Some(code),
        None => match tokio::time::timeout(safety_net, child.wait()).await {
            Ok(Ok(code)) => Some(code),
            _ => {
                let _ = child.kill().await;
                None
            }
        },
    };

    if stderr_open && !forced && exit.is_some() {
        let _ = tokio::time::timeout(safety_net, async {
            while let Ok(n) = stderr.read(&mut stderr_buf).await {
                if n == 0 {
                    break;
                }
                tail.push(&stderr_buf[..n]);
            }
        })
        .await;
    }

    let _ = internal_tx.send(Internal::WatchEnded {
        session,
        end,
        exit_code: exit.flatten(),
        stderr: tail.into_string(),
        decoded,
    });
}
