// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervisor.
//!
//! A single coordinator task owns the [`StateStore`] and every timer. Inputs
//! from the watch session, dependency refreshes and the handle arrive as
//! messages and are applied one at a time. Timers are deadlines held by the
//! coordinator, so cancelling one is clearing a field and nothing fires
//! after a stop.

mod session;

use crate::backoff::Backoff;
use crate::deps::fetch_dependents;
use crate::error::DependencyError;
use crate::store::StateStore;
use session::{run_session, SessionEnd, SessionParams};
use std::time::Duration;
use tb_adapters::{AdapterError, TiltAdapter};
use tb_core::{Clock, ConnectionState, DependentsMap, Event, ResourceRecord, StatusSnapshot};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Timing knobs for the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// First retry delay, and the delay after a successful decode.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Grace period before state is cleared after a disconnect.
    pub stale_grace: Duration,
    /// How long after the child exits its stdout is force-closed.
    pub safety_net: Duration,
    /// Dependency graph refresh interval while connected.
    pub dependency_refresh: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            stale_grace: Duration::from_secs(5),
            safety_net: Duration::from_secs(2),
            dependency_refresh: Duration::from_secs(30),
        }
    }
}

/// Requests from a [`SupervisorHandle`].
#[derive(Debug)]
enum Command {
    Start,
    Stop,
    ReconnectNow,
    Trigger(String),
    Snapshot(oneshot::Sender<StatusSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

/// Messages from tasks spawned by the coordinator.
#[derive(Debug)]
pub(crate) enum Internal {
    Decoded {
        session: u64,
        record: ResourceRecord,
    },
    SpawnFailed {
        session: u64,
        error: AdapterError,
    },
    WatchEnded {
        session: u64,
        end: SessionEnd,
        exit_code: Option<i32>,
        stderr: String,
        decoded: u64,
    },
    DependentsFetched {
        session: u64,
        result: Result<DependentsMap, DependencyError>,
    },
}

/// Cloneable handle for driving a running supervisor.
///
/// The supervisor stops and its task exits once every handle is dropped.
#[derive(Clone)]
pub struct SupervisorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SupervisorHandle {
    /// (Re)start the watch, cancelling any session in flight.
    pub fn start(&self) {
        self.send(Command::Start);
    }

    /// Stop watching. Idempotent.
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Reset backoff and restart immediately.
    pub fn reconnect_now(&self) {
        self.send(Command::ReconnectNow);
    }

    /// Ask the orchestration tool to rebuild a resource. Failures are logged.
    pub fn trigger(&self, resource: impl Into<String>) {
        self.send(Command::Trigger(resource.into()));
    }

    /// Current views, or `None` if the supervisor has exited.
    pub async fn snapshot(&self) -> Option<StatusSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx));
        rx.await.ok()
    }

    /// Stop and wait for the coordinator to exit.
    pub async fn shutdown(self) {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown(tx));
        let _ = rx.await;
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("supervisor already exited");
        }
    }
}

pub struct Supervisor;

impl Supervisor {
    /// Spawn the coordinator task. Must be called inside a tokio runtime.
    ///
    /// Returns the control handle and the ordered change-event stream. The
    /// supervisor starts idle; call [`SupervisorHandle::start`].
    pub fn spawn<T: TiltAdapter, C: Clock>(
        adapter: T,
        clock: C,
        config: SupervisorConfig,
    ) -> (SupervisorHandle, mpsc::UnboundedReceiver<Event>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        let coordinator = Coordinator {
            adapter,
            clock: clock.clone(),
            backoff: Backoff::new(config.initial_backoff, config.max_backoff),
            config,
            store: StateStore::new(clock),
            session: None,
            next_session: 0,
            retry_at: None,
            stale_clear_at: None,
            refresh_at: None,
            events: event_tx,
            internal_tx,
        };
        tokio::spawn(coordinator.run(command_rx, internal_rx));

        (
            SupervisorHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }
}

struct ActiveSession {
    id: u64,
    connected: bool,
    shutdown: oneshot::Sender<()>,
}

struct Coordinator<T, C: Clock> {
    adapter: T,
    clock: C,
    config: SupervisorConfig,
    store: StateStore<C>,
    backoff: Backoff,
    session: Option<ActiveSession>,
    next_session: u64,
    retry_at: Option<Instant>,
    stale_clear_at: Option<Instant>,
    refresh_at: Option<Instant>,
    events: mpsc::UnboundedSender<Event>,
    internal_tx: mpsc::UnboundedSender<Internal>,
}

/// Sleep until `deadline`, or forever when there is none.
pub(crate) async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl<T: TiltAdapter, C: Clock> Coordinator<T, C> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
    ) {
        let mut shutdown_ack = None;
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown(ack)) => {
                        shutdown_ack = Some(ack);
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => break,
                },

                Some(message) = internal.recv() => self.handle_internal(message),

                _ = sleep_until_opt(self.retry_at) => {
                    self.retry_at = None;
                    tracing::info!("retrying watch");
                    self.start();
                }

                _ = sleep_until_opt(self.stale_clear_at) => {
                    self.stale_clear_at = None;
                    tracing::info!(resources = self.store.len(), "reconnect grace period elapsed, clearing state");
                    let events = self.store.clear();
                    self.publish(events);
                }

                _ = sleep_until_opt(self.refresh_at) => {
                    self.refresh_at = Some(Instant::now() + self.config.dependency_refresh);
                    self.refresh_dependencies();
                }
            }
        }

        self.stop();
        tracing::debug!("supervisor exited");
        if let Some(ack) = shutdown_ack {
            let _ = ack.send(());
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::ReconnectNow => {
                tracing::info!("reconnect requested");
                self.backoff.reset();
                self.start();
            }
            Command::Trigger(resource) => self.trigger(resource),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.store.snapshot());
            }
            // Handled by the run loop
            Command::Shutdown(_) => {}
        }
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::Decoded { session, record } => {
                if !self.is_current(session) {
                    return;
                }
                self.on_first_decode();
                let events = self.store.apply_update(record);
                self.publish(events);
            }
            Internal::SpawnFailed { session, error } => {
                if !self.is_current(session) {
                    return;
                }
                let state = if error.is_not_found() {
                    tracing::warn!(session, error = %error, "watch executable unavailable");
                    ConnectionState::ServerUnreachable
                } else {
                    tracing::warn!(session, error = %error, "failed to start watch");
                    ConnectionState::Disconnected
                };
                self.on_session_lost(state);
            }
            Internal::WatchEnded {
                session,
                end,
                exit_code,
                stderr,
                decoded,
            } => {
                if !self.is_current(session) {
                    return;
                }
                tracing::warn!(
                    session,
                    exit_code = ?exit_code,
                    decoded,
                    reason = %end.describe(),
                    stderr = %stderr,
                    "watch ended"
                );
                self.on_session_lost(ConnectionState::Disconnected);
            }
            Internal::DependentsFetched { session, result } => {
                if !self.is_current(session) {
                    return;
                }
                match result {
                    Ok(dependents) => {
                        tracing::debug!(resources = dependents.len(), "dependency graph refreshed");
                        let events = self.store.apply_dependents(dependents);
                        self.publish(events);
                    }
                    Err(e) => tracing::warn!(error = %e, "dependency refresh failed, keeping previous graph"),
                }
            }
        }
    }

    fn is_current(&self, session: u64) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == session)
    }

    fn start(&mut self) {
        self.end_session();
        self.retry_at = None;
        self.refresh_at = None;

        self.next_session += 1;
        let id = self.next_session;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(run_session(SessionParams {
            adapter: self.adapter.clone(),
            session: id,
            internal_tx: self.internal_tx.clone(),
            shutdown_rx,
            safety_net: self.config.safety_net,
        }));
        self.session = Some(ActiveSession {
            id,
            connected: false,
            shutdown: shutdown_tx,
        });

        tracing::info!(session = id, "starting watch");
        let events = self.store.set_connection(ConnectionState::Connecting, None);
        self.publish(events);
    }

    fn stop(&mut self) {
        if self.end_session() {
            tracing::info!("watch stopped");
        }
        self.retry_at = None;
        self.stale_clear_at = None;
        self.refresh_at = None;
        let events = self.store.set_connection(ConnectionState::Disconnected, None);
        self.publish(events);
    }

    /// Signal the live session, if any, to kill its child. Returns whether one was live.
    fn end_session(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                let _ = session.shutdown.send(());
                true
            }
            None => false,
        }
    }

    fn on_first_decode(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.connected {
            return;
        }
        session.connected = true;
        tracing::info!(session = session.id, "watch connected");

        self.backoff.reset();
        self.stale_clear_at = None;
        let events = self.store.set_connection(ConnectionState::Connected, None);
        self.publish(events);

        self.refresh_dependencies();
        self.refresh_at = Some(Instant::now() + self.config.dependency_refresh);
    }

    fn on_session_lost(&mut self, state: ConnectionState) {
        self.session = None;
        self.refresh_at = None;
        if self.stale_clear_at.is_none() {
            self.stale_clear_at = Some(Instant::now() + self.config.stale_grace);
        }

        let delay = self.backoff.next_delay();
        self.retry_at = Some(Instant::now() + delay);
        let next_retry_at = self.clock.utc_now()
            + chrono::Duration::milliseconds(delay.as_millis() as i64);
        tracing::info!(state = %state, delay_ms = delay.as_millis() as u64, "scheduling reconnect");

        let events = self.store.set_connection(state, Some(next_retry_at));
        self.publish(events);
    }

    fn refresh_dependencies(&self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let session = session.id;
        let adapter = self.adapter.clone();
        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = fetch_dependents(&adapter).await;
            let _ = internal_tx.send(Internal::DependentsFetched { session, result });
        });
    }

    fn trigger(&self, resource: String) {
        let adapter = self.adapter.clone();
        tokio::spawn(async move {
            match adapter.trigger(&resource).await {
                Ok(()) => tracing::info!(resource, "update triggered"),
                Err(e) => tracing::warn!(resource, error = %e, "trigger failed"),
            }
        });
    }

    fn publish(&self, events: Vec<Event>) {
        for event in events {
            tracing::debug!(event = %event.log_summary(), "publishing");
            let _ = self.events.send(event);
        }
    }
}

#[cfg(test)]
#[path = "../supervisor_tests/mod.rs"]
mod tests;
