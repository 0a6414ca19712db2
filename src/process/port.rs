use crate::error::{Result, SignupError};
use std::net::TcpListener;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU16, Ordering};

const FIRST_CDP_PORT: u16 = 9222;
const LAST_CDP_PORT: u16 = 65500;
const CDP_PORTS: RangeInclusive<u16> = FIRST_CDP_PORT..=LAST_CDP_PORT;

static CDP_PORT_COUNTER: AtomicU16 = AtomicU16::new(FIRST_CDP_PORT);

/// Next remote-debugging port nobody is listening on.
///
/// Chrome silently runs without DevTools when its port is taken, and the
/// endpoint on that port would then belong to another browser, so busy
/// ports are skipped.
pub fn allocate_cdp_port() -> Result<u16> {
    next_free_port(&CDP_PORT_COUNTER, port_is_free).ok_or_else(|| {
        SignupError::Launch(format!(
            "No free remote-debugging port in {}..={}",
            FIRST_CDP_PORT, LAST_CDP_PORT
        ))
    })
}

fn port_is_free(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Walk the counter through the range once, wrapping at the end, and return
/// the first port `is_free` accepts.
fn next_free_port(counter: &AtomicU16, is_free: impl Fn(u16) -> bool) -> Option<u16> {
    for _ in CDP_PORTS {
        let mut port = counter.fetch_add(1, Ordering::SeqCst);
        if !CDP_PORTS.contains(&port) {
            counter.store(FIRST_CDP_PORT + 1, Ordering::SeqCst);
            port = FIRST_CDP_PORT;
        }
        if is_free(port) {
            return Some(port);
        }
        tracing::debug!("CDP port {} is in use, skipping", port);
    }
    None
}
