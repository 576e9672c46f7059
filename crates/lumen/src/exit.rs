use std::fmt;
use std::io;

use lumen_protocol::ProtocolError;
use lumen_runner::RunnerError;
use lumen_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::ConnectionRefused => TRANSPORT_ERROR,
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    match err {
        ProtocolError::UnsupportedByteOrder => {
            CliError::new(INTERNAL, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn runner_error(context: &str, err: RunnerError) -> CliError {
    match err {
        RunnerError::Transport(err) => transport_error(context, err),
        RunnerError::Effect(err) => CliError::new(FAILURE, format!("{context}: {err}")),
        RunnerError::Join(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_are_data_invalid() {
        let err = protocol_error(
            "encode",
            ProtocolError::BufferOverflow {
                needed: 2000,
                capacity: 1024,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("encode: "));
    }

    #[test]
    fn addr_in_use_is_transport_error() {
        let err = io_error("bind", io::Error::from(io::ErrorKind::AddrInUse));
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn runner_transport_failures_map_to_transport_code() {
        let err = runner_error(
            "start",
            RunnerError::Transport(TransportError::Resolve {
                host: "host.invalid".into(),
                port: 1,
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
