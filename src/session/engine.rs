// ABOUTME: Session actor owning the gateway socket: executes queued command chains in FIFO order
// ABOUTME: Interleaves heartbeats with reads and sleeps, and logs unsolicited modem output while idle

use super::config::SessionConfig;
use super::connection::ModemConnection;
use super::error::{SessionError, SessionResult};
use super::heartbeat::HeartbeatManager;
use super::history::CommandTypeHistory;
use super::types::{ExecutedCommand, ExecutionReport, ExecutionResult, SimModemResponse};
use crate::binary::{from_hex, hex_with_spaces};
use crate::codec;
use crate::command::{CommandChain, SimModemCommand};
use crate::datatypes::{Pdu, PduDirection};
use crate::text::{substitute_unprintable, trim_control};
use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::SystemTime;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep, sleep_until, timeout};
use tracing::{debug, info, warn};

const LINE_TERMINATOR: &[u8] = b"\r\n";
const INCOMING_MESSAGE: &str = "+CMT";

enum SessionMessage {
    Execute {
        chain: CommandChain,
        reply: oneshot::Sender<ExecutionReport>,
    },
}

/// Completes with the report of one chain
///
/// Fails with [`SessionError::EngineStopped`] if the session ends before the
/// chain was executed.
#[derive(Debug)]
pub struct PendingExecution {
    receiver: oneshot::Receiver<ExecutionReport>,
}

impl Future for PendingExecution {
    type Output = SessionResult<ExecutionReport>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| SessionError::EngineStopped))
    }
}

/// Cheap, cloneable handle for queueing chains on a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<SessionMessage>,
}

impl SessionHandle {
    /// Queue `chain` behind every chain queued before it
    pub fn execute(&self, chain: CommandChain) -> PendingExecution {
        let (reply, receiver) = oneshot::channel();
        let chain_type = chain.chain_type;

        if self
            .sender
            .send(SessionMessage::Execute { chain, reply })
            .is_err()
        {
            warn!("Session stopped, dropping {:?} chain", chain_type);
        } else {
            debug!("Queued {:?} chain", chain_type);
        }

        PendingExecution { receiver }
    }
}

enum CommandOutcome {
    Success(SimModemResponse),
    PredicateMismatch(SimModemResponse),
    TimedOut,
    Unavailable,
}

enum ReadOutcome {
    Data(Bytes),
    TimedOut,
    Failed(SessionError),
}

/// The session actor
///
/// Owns the only connection to the gateway. Chains arrive over a channel and
/// are executed one at a time, so command exchanges and heartbeats can never
/// interleave on the socket.
///
/// ```rust,no_run
/// use sim_modem::command::CommandGenerator;
/// use sim_modem::session::{ModemSession, SessionConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = ModemSession::spawn(SessionConfig::new("127.0.0.1", 8080));
/// let chain = CommandGenerator::default().for_signal_quality()?;
///
/// let report = handle.execute(chain).await?;
/// println!("{}", report.result);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ModemSession {
    config: SessionConfig,
    connection: Option<ModemConnection>,
    heartbeat: HeartbeatManager,
    history: CommandTypeHistory,
    receiver: mpsc::UnboundedReceiver<SessionMessage>,
}

impl ModemSession {
    /// Start the session on the current tokio runtime.
    ///
    /// The session runs until every [`SessionHandle`] is dropped.
    pub fn spawn(config: SessionConfig) -> SessionHandle {
        let (sender, receiver) = mpsc::unbounded_channel();

        let session = ModemSession {
            heartbeat: HeartbeatManager::new(config.heartbeat.clone()),
            history: CommandTypeHistory::new(config.history_capacity),
            connection: None,
            config,
            receiver,
        };
        tokio::spawn(session.run());

        SessionHandle { sender }
    }

    async fn run(mut self) {
        info!("Modem session started for {}", self.config.address());

        loop {
            if self.heartbeat.should_beat() {
                self.beat(true).await;
            }

            tokio::select! {
                biased;

                message = self.receiver.recv() => match message {
                    Some(SessionMessage::Execute { chain, reply }) => {
                        let report = self.execute_chain(&chain).await;
                        info!("{:?} chain finished: {}", chain.chain_type, report.result);

                        if reply.send(report).is_err() {
                            debug!("Nobody is waiting for the {:?} report", chain.chain_type);
                        }
                    }
                    None => break,
                },
                _ = sleep(self.config.idle_poll_interval) => self.poll_unsolicited().await,
            }
        }

        info!("Modem session stopped");
    }

    async fn execute_chain(&mut self, chain: &CommandChain) -> ExecutionReport {
        let mut executed = Vec::with_capacity(chain.commands.len());

        for command in &chain.commands {
            let delay = self.history.remaining_required_delay(command.command_type);
            if !delay.is_zero() {
                debug!("Waiting {:?} before {:?}", delay, command.command_type);
                self.wait_until(Instant::now() + delay).await;
            }

            let outcome = self.execute(command).await;
            self.history.record(command.command_type);

            match outcome {
                CommandOutcome::Success(response) => {
                    executed.push(ExecutedCommand::new(command, &response));
                }
                CommandOutcome::PredicateMismatch(response) => {
                    warn!(
                        "Response {} rejected for {}",
                        response.readable, command.readable
                    );
                    executed.push(ExecutedCommand::new(command, &response));
                    return ExecutionReport::new(
                        chain.chain_type,
                        ExecutionResult::PredicateMismatch,
                        executed,
                    );
                }
                CommandOutcome::TimedOut => {
                    warn!("Timed out after {:?} on {}", command.timeout(), command.readable);
                    return ExecutionReport::new(chain.chain_type, ExecutionResult::TimedOut, Vec::new());
                }
                CommandOutcome::Unavailable => {
                    return ExecutionReport::new(chain.chain_type, ExecutionResult::Unavailable, Vec::new());
                }
            }
        }

        ExecutionReport::new(chain.chain_type, ExecutionResult::Success, executed)
    }

    async fn execute(&mut self, command: &SimModemCommand) -> CommandOutcome {
        let mut failures = 0;

        // Retried only while nothing can have reached the modem yet
        let sent_at = loop {
            if let Err(e) = self.ensure_connection().await {
                warn!("Cannot execute {}: {}", command.readable, e);
                return CommandOutcome::Unavailable;
            }

            match self.send(command).await {
                Ok(sent_at) => break sent_at,
                Err(e) => {
                    self.drop_connection(&e);
                    failures += 1;
                    if failures >= self.config.reconnect_attempts {
                        return CommandOutcome::Unavailable;
                    }
                }
            }
        };

        let deadline = Instant::now() + command.timeout();
        let binary = match self.read_response(deadline).await {
            ReadOutcome::Data(binary) => binary,
            ReadOutcome::TimedOut => return CommandOutcome::TimedOut,
            ReadOutcome::Failed(e) => {
                self.drop_connection(&e);
                return CommandOutcome::Unavailable;
            }
        };

        let response = SimModemResponse::new(binary, sent_at, SystemTime::now());
        debug!("{} -> {}", command.readable, response.readable);

        if command.accepts(&response.text()) {
            CommandOutcome::Success(response)
        } else {
            CommandOutcome::PredicateMismatch(response)
        }
    }

    /// Drain stray input, then write the command
    async fn send(&mut self, command: &SimModemCommand) -> SessionResult<SystemTime> {
        let connection = self
            .connection
            .as_mut()
            .ok_or(SessionError::ConnectionClosed)?;

        let stray = connection.drain()?;
        connection.write(&command.binary).await?;
        let sent_at = SystemTime::now();

        if !stray.is_empty() {
            debug!(
                "Drained {} stray byte(s) before {}: {}",
                stray.len(),
                command.readable,
                hex_with_spaces(&stray)
            );
            self.handle_unsolicited(&stray);
        }

        debug!("Sent {}", command.readable);
        Ok(sent_at)
    }

    /// Read until a response other than a bare line terminator arrives
    async fn read_response(&mut self, deadline: Instant) -> ReadOutcome {
        loop {
            let heartbeat_due = self.heartbeat.next_due();
            let Some(connection) = self.connection.as_mut() else {
                return ReadOutcome::Failed(SessionError::ConnectionClosed);
            };

            tokio::select! {
                result = connection.read_chunk() => match result {
                    Ok(chunk) if chunk.as_ref() == LINE_TERMINATOR => {
                        debug!("Discarding bare line terminator");
                    }
                    Ok(chunk) => return ReadOutcome::Data(chunk),
                    Err(e) => return ReadOutcome::Failed(e),
                },
                _ = sleep_until(deadline) => return ReadOutcome::TimedOut,
                _ = sleep_until(heartbeat_due.unwrap_or(deadline)), if heartbeat_due.is_some() => {
                    self.beat(false).await;
                }
            }
        }
    }

    /// Sleep until `deadline`, keeping the gateway alive meanwhile
    async fn wait_until(&mut self, deadline: Instant) {
        loop {
            match self.heartbeat.next_due() {
                Some(due) if due < deadline => {
                    sleep_until(due).await;
                    self.beat(true).await;
                }
                _ => {
                    sleep_until(deadline).await;
                    return;
                }
            }
        }
    }

    /// Write the heartbeat sentinel, connecting first if `connect` is set
    async fn beat(&mut self, connect: bool) {
        if connect {
            if let Err(e) = self.ensure_connection().await {
                warn!("Heartbeat skipped: {}", e);
                self.heartbeat.on_beat_failure();
                return;
            }
        }

        let Some(connection) = self.connection.as_mut() else {
            self.heartbeat.on_beat_failure();
            return;
        };

        let sentinel = self.heartbeat.sentinel().clone();
        match connection.write(&sentinel).await {
            Ok(()) => self.heartbeat.on_beat_sent(),
            Err(e) => {
                self.drop_connection(&e);
                self.heartbeat.on_beat_failure();
            }
        }
    }

    async fn ensure_connection(&mut self) -> SessionResult<()> {
        if self.connection.is_some() {
            return Ok(());
        }

        let address = self.config.address();
        let attempts = self.config.reconnect_attempts;

        for attempt in 1..=attempts {
            match ModemConnection::connect(
                &address,
                self.config.connect_timeout,
                self.config.read_buffer_size,
            )
            .await
            {
                Ok(connection) => {
                    info!("Connected to modem gateway at {}", address);
                    self.connection = Some(connection);
                    return Ok(());
                }
                Err(e) => warn!("Connection attempt {}/{} to {} failed: {}", attempt, attempts, address, e),
            }
        }

        Err(SessionError::Unavailable { attempts })
    }

    fn drop_connection(&mut self, error: &SessionError) {
        if self.connection.take().is_some() {
            info!("Connection to modem gateway lost: {}", error);
        }
    }

    async fn poll_unsolicited(&mut self) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };

        let polled = timeout(self.config.unsolicited_read_timeout, connection.read_chunk()).await;
        match polled {
            Ok(Ok(data)) => self.handle_unsolicited(&data),
            Ok(Err(e)) => self.drop_connection(&e),
            Err(_) => {}
        }
    }

    fn handle_unsolicited(&self, data: &[u8]) {
        let text = String::from_utf8_lossy(data);
        let text = trim_control(&text);
        if text.is_empty() {
            return;
        }

        let prefix = text.split(':').next().unwrap_or_default();
        match prefix {
            INCOMING_MESSAGE => match incoming_message(text) {
                Ok(pdu) => info!(
                    "Incoming message from {}: {:?}",
                    pdu.destination, pdu.message
                ),
                Err(e) => info!(
                    "Incoming message notification {} could not be decoded: {}",
                    substitute_unprintable(text),
                    e
                ),
            },
            _ => warn!("Discarding unsolicited data {}", substitute_unprintable(text)),
        }
    }
}

/// Decode the PDU line following a `+CMT: [<alpha>],<length>` header
fn incoming_message(notification: &str) -> SessionResult<Pdu> {
    let pdu_line = notification
        .lines()
        .skip(1)
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or(SessionError::EndOfBuffer("notification has no PDU line"))?;

    let data = from_hex(pdu_line)
        .map_err(|e| SessionError::MalformedNotification(format!("{pdu_line:?}: {e}")))?;

    Ok(codec::decode(PduDirection::ScToMs, &data)?)
}
