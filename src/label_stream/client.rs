use crate::log_debug;
use std::io::{self, ErrorKind, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

const STOP_POLL: Duration = Duration::from_millis(50);

/// Connecting end of the label stream.
#[derive(Debug)]
pub struct LabelSender {
    stream: Option<TcpStream>,
    peer: String,
}

impl LabelSender {
    pub fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        let _ = stream.set_nodelay(true);
        Ok(Self {
            stream: Some(stream),
            peer: addr.to_string(),
        })
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Write one label. On failure the connection is dropped and the label is lost.
    pub fn send_line(&mut self, label: &str) -> io::Result<()> {
        if label.contains('\n') {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "label must not contain a newline",
            ));
        }
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::new(ErrorKind::NotConnected, "label stream is closed"))?;
        let mut line = String::with_capacity(label.len() + 1);
        line.push_str(label);
        line.push('\n');
        if let Err(err) = stream.write_all(line.as_bytes()).and_then(|()| stream.flush()) {
            self.close();
            return Err(err);
        }
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Keep trying `addr` with a fixed delay until it connects or `stop` is set.
pub fn connect_with_retry(addr: &str, delay: Duration, stop: &AtomicBool) -> Option<LabelSender> {
    let mut attempt: u64 = 0;
    while !stop.load(Ordering::Relaxed) {
        attempt += 1;
        match LabelSender::connect(addr) {
            Ok(sender) => {
                tracing::info!(target: "gazekey::producer", addr, attempt, "connected to display");
                return Some(sender);
            }
            Err(err) => {
                tracing::warn!(
                    target: "gazekey::producer",
                    addr,
                    attempt,
                    error = %err,
                    "display unreachable; retrying in {:?}",
                    delay
                );
                log_debug(&format!("connect to {addr} failed (attempt {attempt}): {err}"));
                sleep_unless_stopped(delay, stop);
            }
        }
    }
    None
}

fn sleep_unless_stopped(delay: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + delay;
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(STOP_POLL.min(deadline - now));
    }
}
