use std::net::SocketAddr;

use lumen_protocol::{decode_message, FreshnessFilter, MAX_MESSAGE_SIZE};
use lumen_transport::UdpReceiver;
use tracing::{debug, warn};

use crate::cmd::{runtime, ListenArgs};
use crate::exit::{io_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let addr: SocketAddr = args
        .bind
        .parse()
        .map_err(|err| CliError::new(USAGE, format!("invalid bind address {:?}: {err}", args.bind)))?;
    runtime()?.block_on(listen(addr, args.count, format))
}

async fn listen(addr: SocketAddr, count: Option<usize>, format: OutputFormat) -> CliResult<i32> {
    let receiver = UdpReceiver::bind(addr)
        .await
        .map_err(|err| transport_error("bind failed", err))?;

    let mut filter = FreshnessFilter::new();
    let mut buf = [0u8; MAX_MESSAGE_SIZE];
    let mut printed = 0usize;

    loop {
        if count.is_some_and(|count| printed >= count) {
            return Ok(SUCCESS);
        }

        let (len, from) = tokio::select! {
            received = receiver.recv(&mut buf) => {
                received.map_err(|err| transport_error("receive failed", err))?
            }
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|err| io_error("signal handler setup failed", err))?;
                return Ok(SUCCESS);
            }
        };

        let message = match decode_message(&buf[..len]) {
            Ok(message) => message,
            Err(err) => {
                warn!(%from, bytes = len, error = %err, "undecodable datagram");
                continue;
            }
        };
        if !filter.accept(&message) {
            debug!(%from, "stale message dropped");
            continue;
        }

        print_message(&message, from, format);
        printed = printed.saturating_add(1);
    }
}
