//! Async driver that connects an [`Engine`] to a [`CalculatorClient`].
//!
//! A session runs as one task that owns the engine. Key presses arrive over a
//! command channel, service calls run in their own tasks bounded by the
//! configured timeout, and every state change is published as a [`Snapshot`]
//! on a watch channel. Successful evaluations trigger a history refresh; a
//! history reply older than one already shown is dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use calculator_sdk::{AngleUnit, CalculatorClient, CalculatorError, HistoryEntry};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::engine::{Call, Engine, Request, Resolution, Step, Ticket};
use crate::entry::{EntryState, Phase};
use crate::input::Input;

const COMMAND_QUEUE: usize = 64;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound for a single service call.
    pub request_timeout: Duration,
    pub angle_unit: AngleUnit,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            angle_unit: AngleUnit::Deg,
        }
    }
}

/// Everything a front end needs to render the calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub entry: EntryState,
    pub phase: Phase,
    pub angle_unit: AngleUnit,
    /// An evaluation is in flight.
    pub busy: bool,
    /// A history refresh is in flight.
    pub syncing: bool,
    /// Failure of the most recent evaluation, cleared by the next success or `Clear`.
    pub last_error: Option<CalculatorError>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("calculator session has stopped")]
    Closed,
    #[error(transparent)]
    Service(#[from] CalculatorError),
}

enum Command {
    Press {
        input: Input,
        reply: oneshot::Sender<Step>,
    },
    RefreshHistory {
        reply: oneshot::Sender<()>,
    },
    ClearHistory {
        reply: oneshot::Sender<Result<(), CalculatorError>>,
    },
}

enum Event {
    Resolved {
        ticket: Ticket,
        outcome: Result<f64, CalculatorError>,
    },
    History {
        generation: u64,
        result: Result<Vec<HistoryEntry>, CalculatorError>,
    },
}

/// Cloneable front-end handle; the session stops when the last handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    /// Apply one input and return what it did.
    ///
    /// The published snapshot already reflects the input when this returns.
    ///
    /// # Errors
    /// `Closed` if the session task has stopped.
    pub async fn press(&self, input: Input) -> Result<Step, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Press { input, reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.clone()
    }

    /// Wait until no evaluation or history refresh is in flight.
    ///
    /// # Errors
    /// `Closed` if the session task has stopped.
    pub async fn settled(&self) -> Result<Snapshot, SessionError> {
        let mut state = self.state.clone();
        let snapshot = state
            .wait_for(|s| !s.busy && !s.syncing)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Ask the session to reload history from the service.
    ///
    /// The published snapshot is marked `syncing` when this returns.
    ///
    /// # Errors
    /// `Closed` if the session task has stopped.
    pub async fn refresh_history(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RefreshHistory { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Clear history on the service and reload it.
    ///
    /// # Errors
    /// `Service` when the service rejects the request, `Closed` if the
    /// session task has stopped.
    pub async fn clear_history(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ClearHistory { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

pub struct Session<C: ?Sized> {
    client: Arc<C>,
    engine: Engine,
    timeout: Duration,
    history: Vec<HistoryEntry>,
    /// Last history fetch issued; replies older than `history_applied` are dropped.
    history_requested: u64,
    history_applied: u64,
    last_error: Option<CalculatorError>,
    syncing: usize,
    events: mpsc::UnboundedSender<Event>,
    state: watch::Sender<Snapshot>,
}

impl<C> Session<C>
where
    C: CalculatorClient + ?Sized + 'static,
{
    /// Start a session task on the current runtime.
    #[must_use]
    pub fn spawn(client: Arc<C>, config: SessionConfig) -> SessionHandle {
        let (command_sender, commands) = mpsc::channel(COMMAND_QUEUE);
        let (event_sender, events) = mpsc::unbounded_channel();

        let engine = Engine::with_angle_unit(config.angle_unit);
        let initial = Snapshot {
            entry: engine.entry().clone(),
            phase: engine.phase(),
            angle_unit: engine.angle_unit(),
            busy: false,
            // The task loads history as soon as it starts.
            syncing: true,
            last_error: None,
            history: Vec::new(),
        };
        let (publisher, state) = watch::channel(initial);

        let session = Self {
            client,
            engine,
            timeout: config.request_timeout,
            history: Vec::new(),
            history_requested: 0,
            history_applied: 0,
            last_error: None,
            syncing: 0,
            events: event_sender,
            state: publisher,
        };
        tokio::spawn(session.run(commands, events));

        SessionHandle {
            commands: command_sender,
            state,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        info!(timeout_ms = self.timeout.as_millis(), "calculator session started");
        self.start_history_refresh();
        self.publish();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(event) = events.recv() => self.on_event(event),
            }
        }
        info!("calculator session stopped");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Press { input, reply } => {
                let step = self.engine.apply(input);
                match step {
                    Step::Request(request) => self.start_request(request),
                    Step::Applied if input == Input::Clear => self.last_error = None,
                    _ => {}
                }
                self.publish();
                if reply.send(step).is_err() {
                    debug!("press caller went away before the reply");
                }
            }
            Command::RefreshHistory { reply } => {
                self.start_history_refresh();
                self.publish();
                if reply.send(()).is_err() {
                    debug!("refresh caller went away before the reply");
                }
            }
            Command::ClearHistory { reply } => {
                let generation = self.next_history_generation();
                let client = Arc::clone(&self.client);
                let events = self.events.clone();
                let timeout = self.timeout;
                tokio::spawn(async move {
                    let cleared = bounded(timeout, client.clear_history()).await;
                    let history = match &cleared {
                        Ok(()) => bounded(timeout, client.get_history()).await,
                        Err(e) => Err(e.clone()),
                    };
                    let event = Event::History {
                        generation,
                        result: history,
                    };
                    if events.send(event).is_err() {
                        debug!("session stopped before history was cleared");
                    }
                    if reply.send(cleared).is_err() {
                        debug!("clear-history caller went away before the reply");
                    }
                });
                self.publish();
            }
        }
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Resolved { ticket, outcome } => match self.engine.resolve(ticket, outcome) {
                Resolution::Completed(_) => {
                    self.last_error = None;
                    self.start_history_refresh();
                }
                Resolution::Failed(err) => self.last_error = Some(err),
                Resolution::Stale => {}
            },
            Event::History { generation, result } => {
                self.syncing = self.syncing.saturating_sub(1);
                match result {
                    Ok(history) if generation > self.history_applied => {
                        self.history_applied = generation;
                        self.history = history;
                    }
                    Ok(_) => debug!(generation, "discarding superseded history"),
                    Err(err) => warn!(error = %err, "failed to refresh history"),
                }
            }
        }
        self.publish();
    }

    fn start_request(&self, request: Request) {
        debug!(ticket = ?request.ticket, call = ?request.call, "sending request");
        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            let outcome = bounded(timeout, perform(client.as_ref(), request.call)).await;
            let event = Event::Resolved {
                ticket: request.ticket,
                outcome,
            };
            if events.send(event).is_err() {
                debug!("session stopped before the request finished");
            }
        });
    }

    fn start_history_refresh(&mut self) {
        let generation = self.next_history_generation();
        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            let result = bounded(timeout, client.get_history()).await;
            if events.send(Event::History { generation, result }).is_err() {
                debug!("session stopped before history arrived");
            }
        });
    }

    fn next_history_generation(&mut self) -> u64 {
        self.syncing += 1;
        self.history_requested += 1;
        self.history_requested
    }

    fn publish(&self) {
        let snapshot = Snapshot {
            entry: self.engine.entry().clone(),
            phase: self.engine.phase(),
            angle_unit: self.engine.angle_unit(),
            busy: self.engine.is_busy(),
            syncing: self.syncing > 0,
            last_error: self.last_error.clone(),
            history: self.history.clone(),
        };
        self.state.send_replace(snapshot);
    }
}

async fn perform<C>(client: &C, call: Call) -> Result<f64, CalculatorError>
where
    C: CalculatorClient + ?Sized,
{
    match call {
        Call::Binary { op, a, b } => client.evaluate_binary(op, a, b).await,
        Call::Unary { function, x, unit } => client.evaluate_unary(function, x, unit).await,
        Call::Random => client.random().await,
    }
}

async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, CalculatorError>
where
    F: Future<Output = Result<T, CalculatorError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(CalculatorError::Timeout(timeout)))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[path = "session_tests.rs"]
mod session_tests;
