// ABOUTME: Cross-module tests: reference PDUs, generator output and session runs against a mock gateway
// ABOUTME: The mock gateway is a TcpListener answering each received chunk with scripted replies

use crate::binary::{from_hex, to_hex};
use crate::codec;
use crate::command::{CommandGenerator, CommandType};
use crate::datatypes::{ConcatenatedShortMessage, PduDirection, ValidityPeriod, ValidityPeriodUnit};
use crate::service::ModemService;
use crate::session::{ExecutionResult, HeartbeatConfig, ModemSession, SessionConfig};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const LOREM: &str = "Lorem ipsum dolor sit amet, consetetur sadipscing elitr, sed diam nonumy eirmod tempor invidunt ut labore et dolore magna aliquyam erat, sed diam voluptua. At vero eos et accusam et justo duo dolores et ea rebum. Stet clita kasd gubergren, no sea takimata sanctus est Lorem ipsum dolor sit amet. Lorem ipsum dolor sit amet, consetetur sadipscing elitr, sed diam nonumy eirmod tempor invidunt ut labore.";

const LOREM_PARTS: [&str; 3] = [
    "0891345600090000F071000D91342143658709F1001100A0050003000301986F79B90D4AC3E7F53688FC66BFE5A0799A0E0AB7CB741668FC76CFCBF432BD2E07CDC3E4347C3E4EBBCFA0323B4D97B340F33219444E87DB20F7DB5D6FE741E5B4BCFD2683E8E536FC2D07A5DDF634B9EEA683EA74103B2C7ECBCBA0321D447EB3DFF232A81D3EBBC3A0303B1DAFE7C36D50591EA6B340F33219444E87DB20FB9B5D87D3EB1A",
    "0891345600090000F071000D91342143658709F1001100A0050003000302C22E50900EB297E56F50F93D0795E9A0F0785C9F87DBA0321DA4AECFE96F10B9FE0691DFECB7BC3C0795E9A07218242F8BEB6D17684A2FD34163769A1E06ADC37332E85C1797E56779D9CD02B9DFA079390CA287D7E976981E06CDC3EE31BD3E0795E77410F32D2FB74169F8BCDE0691DFECB71C344FD341E17699EE0231DFF2721B9486CFEB1A",
    "0891345600090000F071000D91342143658709F100110067050003000303DA20F29BFD9683E6693A28DC2ED359A0F1DB3D2FD3CBF4BA1C340F93D3F0F938ED3E83CAEC345DCE02CDCB6410391D6E83DC6F77BD9D0795D3F2F69B0CA297DBF0B71C9476DBD3E4BA9B0EAAD341ECB0F82D2FBB1A",
];

const RECIPIENT: &str = "+4312345678901";

mod reference_pdus {
    use super::*;

    #[test]
    fn test_decode_concatenated_parts() {
        let mut text = String::new();

        for (index, part) in LOREM_PARTS.iter().enumerate() {
            let pdu = codec::decode(PduDirection::MsToSc, &from_hex(part).unwrap()).unwrap();

            assert_eq!(pdu.smsc.as_ref().unwrap().number, "4365009000000");
            assert_eq!(pdu.destination.number, "4312345678901");
            assert_eq!(
                pdu.validity_period,
                Some(ValidityPeriod::new(ValidityPeriodUnit::Minutes, 5.0).unwrap())
            );

            let concat = pdu.header.as_ref().unwrap().concatenated_short_message().unwrap();
            assert_eq!(
                *concat,
                ConcatenatedShortMessage::new(None, 3, index as u8 + 1).unwrap()
            );

            text.push_str(&pdu.message);
        }

        assert_eq!(text, LOREM);
    }

    #[test]
    fn test_generator_reproduces_parts() {
        let validity_period = ValidityPeriod::new(ValidityPeriodUnit::Minutes, 5.0).unwrap();
        let chain = CommandGenerator::default()
            .for_sending_sms(RECIPIENT, LOREM, Some(validity_period))
            .unwrap();

        assert_eq!(chain.commands.len(), 7);
        assert_eq!(chain.commands[0].readable, "AT+CMGF=0\\r\\n");

        let lengths = [156, 156, 106];
        for (index, part) in LOREM_PARTS.iter().enumerate() {
            let prompt = &chain.commands[1 + index * 2];
            let body = &chain.commands[2 + index * 2];

            assert_eq!(prompt.command_type, CommandType::SendSmsPrompt);
            assert_eq!(
                prompt.binary.as_ref(),
                format!("AT+CMGS={}\r\n", lengths[index]).as_bytes()
            );

            assert_eq!(body.command_type, CommandType::SendSmsBody);
            assert_eq!(body.binary.as_ref(), format!("{part}\u{1A}\r\n").as_bytes());
        }
    }

    #[test]
    fn test_reencode_matches_reference() {
        for part in LOREM_PARTS {
            let pdu = codec::decode(PduDirection::MsToSc, &from_hex(part).unwrap()).unwrap();
            assert_eq!(to_hex(&codec::encode(&pdu).unwrap()), part);
        }
    }
}

mod session_runs {
    use super::*;

    type Received = (Instant, String);

    /// Accept one connection and answer every chunk with `respond(chunk)`,
    /// writing each reply separately.
    async fn spawn_gateway<F>(respond: F) -> (SessionConfig, mpsc::UnboundedReceiver<Received>)
    where
        F: Fn(&str) -> Vec<&'static str> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = [0u8; 1024];

            loop {
                let n = match socket.read(&mut buffer).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => n,
                };
                let text = String::from_utf8_lossy(&buffer[..n]).into_owned();
                let replies = respond(&text);
                let _ = sender.send((Instant::now(), text));

                for reply in replies {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    if socket.write_all(reply.as_bytes()).await.is_err() {
                        return;
                    }
                }
            }
        });

        let config = SessionConfig::new("127.0.0.1", port).with_heartbeat(HeartbeatConfig::disabled());
        (config, receiver)
    }

    fn modem(command: &str) -> Vec<&'static str> {
        if command.starts_with("AT+CMGS=") {
            vec!["\r\n> "]
        } else if command.contains('\u{1A}') {
            vec!["\r\n+CMGS: 7\r\n\r\nOK\r\n"]
        } else if command.starts_with("AT+CSQ") {
            vec!["\r\n+CSQ: 21,99\r\n\r\nOK\r\n"]
        } else if command.starts_with("AT") {
            vec!["\r\nOK\r\n"]
        } else {
            vec![]
        }
    }

    fn drain(receiver: &mut mpsc::UnboundedReceiver<Received>) -> Vec<String> {
        let mut commands = Vec::new();
        while let Ok((_, command)) = receiver.try_recv() {
            commands.push(command);
        }
        commands
    }

    #[tokio::test]
    async fn test_send_sms_success() {
        let (config, mut received) = spawn_gateway(modem).await;
        let service = ModemService::new(config);

        let report = service.for_sending_sms(RECIPIENT, "Hi", None).unwrap().await.unwrap();

        assert_eq!(report.result, ExecutionResult::Success);
        assert_eq!(report.executed_commands.len(), 3);
        assert_eq!(report.executed_commands[1].readable_command, "AT+CMGS=16\\r\\n");
        assert_eq!(report.executed_commands[1].readable_response, "\\r\\n> ");
        assert_eq!(report.executed_commands[2].timeout_ms, 10000);

        let commands = drain(&mut received);
        assert_eq!(
            commands,
            vec![
                "AT+CMGF=0\r\n".to_string(),
                "AT+CMGS=16\r\n".to_string(),
                "0891345600090000F021000D91342143658709F1001102C834\u{1A}\r\n".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_predicate_mismatch_stops_chain() {
        let (config, mut received) = spawn_gateway(|command| {
            if command.starts_with("AT+CMGS=") {
                vec!["\r\nERROR\r\n"]
            } else {
                vec!["\r\nOK\r\n"]
            }
        })
        .await;
        let service = ModemService::new(config);

        let report = service.for_sending_sms(RECIPIENT, "Hi", None).unwrap().await.unwrap();

        assert_eq!(report.result, ExecutionResult::PredicateMismatch);
        assert_eq!(report.executed_commands.len(), 2);
        assert_eq!(report.executed_commands[0].readable_response, "\\r\\nOK\\r\\n");
        assert_eq!(report.executed_commands[1].readable_response, "\\r\\nERROR\\r\\n");

        // The body is never sent
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(drain(&mut received).len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_reports_no_commands() {
        let (config, _received) = spawn_gateway(|_| vec![]).await;
        let service = ModemService::new(config);

        let report = service
            .for_custom_command("41540D0A", "AT\r\n", Duration::from_millis(200))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(report.result, ExecutionResult::TimedOut);
        assert!(report.executed_commands.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SessionConfig::new("127.0.0.1", port)
            .with_heartbeat(HeartbeatConfig::disabled())
            .with_reconnect_attempts(2)
            .with_connect_timeout(Duration::from_millis(200));
        let service = ModemService::new(config);

        let report = service.for_signal_quality().unwrap().await.unwrap();
        assert_eq!(report.result, ExecutionResult::Unavailable);
        assert!(report.executed_commands.is_empty());
    }

    #[tokio::test]
    async fn test_bare_line_terminator_is_skipped() {
        let (config, _received) = spawn_gateway(|_| vec!["\r\n", "\r\n+CSQ: 21,99\r\n\r\nOK\r\n"]).await;
        let service = ModemService::new(config);

        let report = service.for_signal_quality().unwrap().await.unwrap();

        assert_eq!(report.result, ExecutionResult::Success);
        assert_eq!(
            report.executed_commands[0].readable_response,
            "\\r\\n+CSQ: 21,99\\r\\n\\r\\nOK\\r\\n"
        );
    }

    #[tokio::test]
    async fn test_chains_run_in_submission_order() {
        let (config, mut received) = spawn_gateway(modem).await;
        let service = ModemService::new(config);

        let first = service.for_signal_quality().unwrap();
        let second = service.for_subscriber_number().unwrap();
        let third = service.for_selectable_character_sets().unwrap();

        let (first, second, third) = tokio::join!(first, second, third);
        assert!(first.unwrap().is_success());
        assert!(second.unwrap().is_success());
        assert!(third.unwrap().is_success());

        assert_eq!(
            drain(&mut received),
            vec![
                "AT+CSQ\r\n".to_string(),
                "AT+CNUM\r\n".to_string(),
                "AT+CSCS=?\r\n".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_bodies_are_spaced() {
        let (config, mut received) = spawn_gateway(modem).await;
        let service = ModemService::new(config);

        let report = service
            .for_sending_sms(RECIPIENT, &"a".repeat(161), None)
            .unwrap()
            .await
            .unwrap();
        assert_eq!(report.result, ExecutionResult::Success);
        assert_eq!(report.executed_commands.len(), 5);

        let mut bodies = Vec::new();
        while let Ok((at, command)) = received.try_recv() {
            if command.contains('\u{1A}') {
                bodies.push(at);
            }
        }
        assert_eq!(bodies.len(), 2);
        assert!(bodies[1].duration_since(bodies[0]) >= Duration::from_millis(3500));
    }

    #[tokio::test]
    async fn test_heartbeat_while_idle() {
        let (config, mut received) = spawn_gateway(|_| vec![]).await;
        let config = config.with_heartbeat(HeartbeatConfig::new(Duration::from_millis(50)));
        let _handle = ModemSession::spawn(config);

        for _ in 0..3 {
            let (_, chunk) = tokio::time::timeout(Duration::from_secs(2), received.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(chunk.contains("<heartbeat>"));
        }
    }

    #[tokio::test]
    async fn test_heartbeat_during_long_read() {
        let (config, mut received) = spawn_gateway(|_| vec![]).await;
        let config = config.with_heartbeat(HeartbeatConfig::new(Duration::from_millis(50)));
        let handle = ModemSession::spawn(config);

        let chain = CommandGenerator::default()
            .for_custom_command("41540D0A", "AT\r\n", Duration::from_millis(400))
            .unwrap();
        let report = handle.execute(chain).await.unwrap();
        assert_eq!(report.result, ExecutionResult::TimedOut);

        let chunks = drain(&mut received);
        let command = chunks.iter().position(|chunk| chunk.contains("AT\r\n")).unwrap();
        assert!(chunks[command + 1..].iter().any(|chunk| chunk.contains("<heartbeat>")));
    }
}
