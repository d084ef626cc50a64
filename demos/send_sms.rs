// ABOUTME: Demo sending one SMS through a modem socket gateway using the service facade
// ABOUTME: Prints the transcript of every executed command together with the chain result

use argh::FromArgs;
use sim_modem::datatypes::ValidityPeriodUnit;
use sim_modem::service::ModemService;
use sim_modem::session::{HeartbeatConfig, SessionConfig};
use std::error::Error;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Send an SMS through the modem behind a socket gateway
#[derive(FromArgs)]
struct CliArgs {
    /// log everything the session does
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// hostname or IP address of the gateway (default: 127.0.0.1)
    #[argh(option)]
    host: Option<String>,

    /// port of the gateway (default: 8080)
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// milliseconds between heartbeats (default: 2000)
    #[argh(option)]
    heartbeat_ms: Option<u64>,

    /// hours until the network discards the message, 12.5 to 24 in half-hour steps
    #[argh(option)]
    validity_hours: Option<f64>,

    /// the message to send
    #[argh(option, short = 'm')]
    message: String,

    /// the recipient in international format, e.g. +4312345678901
    #[argh(option, short = 't')]
    to: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = SessionConfig::new(
        cli_args.host.unwrap_or_else(|| "127.0.0.1".to_owned()),
        cli_args.port.unwrap_or(8080),
    );
    if let Some(period) = cli_args.heartbeat_ms {
        config = config.with_heartbeat(HeartbeatConfig::new(Duration::from_millis(period)));
    }

    let service = ModemService::new(config);
    let validity_period = cli_args
        .validity_hours
        .map(|hours| (ValidityPeriodUnit::Hours, hours));

    let report = service
        .for_sending_sms(&cli_args.to, &cli_args.message, validity_period)?
        .await?;

    for command in &report.executed_commands {
        println!("-> {}", command.readable_command);
        println!("<- {}", command.readable_response);
    }
    println!("Result: {}", report.result);

    if report.is_success() {
        Ok(())
    } else {
        Err(format!("sending failed: {}", report.result).into())
    }
}
