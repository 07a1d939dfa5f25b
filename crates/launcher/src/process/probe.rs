use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::BackgroundProcess;
use crate::common::{LaunchError, Result};
use crate::config::ProbeConfig;

/// Lower bound for a single connect attempt.
const MIN_CONNECT_TIMEOUT: Duration = Duration::from_millis(10);

/// Blocks until `127.0.0.1:<port>` accepts a TCP connection.
///
/// Before each attempt the child is polled; if it has already exited there is
/// nothing left to wait for. Returns the 1-based attempt that succeeded.
///
/// # Errors
///
/// [`LaunchError::EmulatorExited`] if the child exits first,
/// [`LaunchError::Poll`] if polling it fails, and
/// [`LaunchError::DebugPortUnavailable`] once every attempt has been used.
pub fn wait_for_port(
    port: u16,
    probe: &ProbeConfig,
    child: &mut dyn BackgroundProcess,
) -> Result<u32> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let attempts = probe.attempts.max(1);
    let backoff = probe.backoff();

    for attempt in 1..=attempts {
        if let Some(status) = child.try_wait().map_err(LaunchError::Poll)? {
            return Err(LaunchError::EmulatorExited { status });
        }
        match TcpStream::connect_timeout(&addr, backoff.max(MIN_CONNECT_TIMEOUT)) {
            Ok(_stream) => {
                debug!(port, attempt, "debug port accepting connections");
                return Ok(attempt);
            }
            Err(e) => {
                debug!(port, attempt, error = %e, "debug port not ready");
                if attempt < attempts {
                    thread::sleep(backoff);
                }
            }
        }
    }

    Err(LaunchError::DebugPortUnavailable { port, attempts })
}
