use bytes::Bytes;
use lumen_protocol::{ControllerMessage, MessageEncoder};
use lumen_strip::Rgb8;
use lumen_transport::{Connection, UdpConnection};

use crate::cmd::{runtime, SendArgs, SendMessage};
use crate::exit::{protocol_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_sent, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let (host, port) = parse_target(&args.target)?;
    let message = build_message(&args.message)?;

    let mut encoder = MessageEncoder::new();
    let datagram = encoder
        .encode(&message)
        .map(Bytes::copy_from_slice)
        .map_err(|err| protocol_error("encode failed", err))?;

    runtime()?.block_on(async {
        let connection = UdpConnection::connect(&host, port, None)
            .await
            .map_err(|err| transport_error("connect failed", err))?;
        let bytes = datagram.len();
        connection
            .send(datagram)
            .await
            .map_err(|err| transport_error("send failed", err))?;
        print_sent(&message, bytes, connection.remote_addr(), format);
        Ok(SUCCESS)
    })
}

fn build_message(message: &SendMessage) -> CliResult<ControllerMessage> {
    match message {
        SendMessage::Keepalive { duration_ms } => Ok(ControllerMessage::keep_alive(*duration_ms)),
        SendMessage::Solid { color, pixels } => {
            let color = Rgb8::from_hex(color).ok_or_else(|| {
                CliError::new(USAGE, format!("--color must be RRGGBB hex, got {color:?}"))
            })?;
            Ok(ControllerMessage::led_state(vec![color; *pixels]))
        }
    }
}

/// Split `host:port`. IPv6 hosts may be bracketed.
fn parse_target(target: &str) -> CliResult<(String, u16)> {
    let (host, port) = target
        .rsplit_once(':')
        .ok_or_else(|| CliError::new(USAGE, format!("target must be host:port, got {target:?}")))?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(CliError::new(USAGE, format!("target {target:?} has no host")));
    }
    let port = port
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid port in {target:?}")))?;
    Ok((host.to_string(), port))
}
