// ABOUTME: Request-level facade pairing the command generator with a running modem session
// ABOUTME: Each operation builds a chain, queues it and hands back the pending execution

use crate::command::{CommandChain, CommandGenerator, GeneratorResult};
use crate::datatypes::{ValidityPeriod, ValidityPeriodUnit};
use crate::session::{ModemSession, PendingExecution, SessionConfig, SessionHandle, SessionResult};
use std::time::Duration;
use tracing::info;

/// Entry point for code driving the modem
///
/// Requests that cannot be turned into commands fail immediately. Everything
/// else is queued, and the returned [`PendingExecution`] completes once the
/// session has executed the chain.
///
/// ```rust,no_run
/// use sim_modem::datatypes::ValidityPeriodUnit;
/// use sim_modem::service::ModemService;
/// use sim_modem::session::SessionConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = ModemService::new(SessionConfig::new("127.0.0.1", 8080));
///
/// let report = service
///     .for_sending_sms("+4312345678901", "Hello", Some((ValidityPeriodUnit::Hours, 12.5)))?
///     .await?;
/// assert!(report.is_success());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ModemService {
    generator: CommandGenerator,
    session: SessionHandle,
}

impl ModemService {
    /// Spawn a session for `config` on the current tokio runtime
    pub fn new(config: SessionConfig) -> Self {
        Self::with_generator(CommandGenerator::default(), ModemSession::spawn(config))
    }

    pub fn with_generator(generator: CommandGenerator, session: SessionHandle) -> Self {
        Self { generator, session }
    }

    /// Send `message` to `recipient`, optionally expiring after a relative validity period
    pub fn for_sending_sms(
        &self,
        recipient: &str,
        message: &str,
        validity_period: Option<(ValidityPeriodUnit, f64)>,
    ) -> SessionResult<PendingExecution> {
        let validity_period = validity_period
            .map(|(unit, value)| ValidityPeriod::new(unit, value))
            .transpose()?;

        info!("Sending SMS to {}", recipient);
        self.enqueue(
            self.generator
                .for_sending_sms(recipient, message, validity_period),
        )
    }

    pub fn for_signal_quality(&self) -> SessionResult<PendingExecution> {
        self.enqueue(self.generator.for_signal_quality())
    }

    pub fn for_subscriber_number(&self) -> SessionResult<PendingExecution> {
        self.enqueue(self.generator.for_subscriber_number())
    }

    pub fn for_selected_character_set(&self) -> SessionResult<PendingExecution> {
        self.enqueue(self.generator.for_selected_character_set())
    }

    pub fn for_selectable_character_sets(&self) -> SessionResult<PendingExecution> {
        self.enqueue(self.generator.for_selectable_character_sets())
    }

    /// Send raw bytes given as hex, with `readable` standing in for them in reports
    pub fn for_custom_command(
        &self,
        binary_hex: &str,
        readable: &str,
        timeout: Duration,
    ) -> SessionResult<PendingExecution> {
        self.enqueue(
            self.generator
                .for_custom_command(binary_hex, readable, timeout),
        )
    }

    fn enqueue(&self, chain: GeneratorResult<CommandChain>) -> SessionResult<PendingExecution> {
        Ok(self.session.execute(chain?))
    }
}
