use super::LineReader;
use crate::log_debug;
use crossbeam_channel::Sender;
use std::io::{self, ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const ACCEPT_POLL: Duration = Duration::from_millis(25);

/// What the transport hands to the consumer queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Connected(String),
    Line(String),
    Disconnected(String),
}

/// Listening end of the label stream.
pub struct LabelServer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl LabelServer {
    pub fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start accepting producers. Every connection gets its own reader thread
    /// that forwards lines into `tx` in arrival order.
    pub fn spawn(self, tx: Sender<StreamEvent>) -> io::Result<ServerHandle> {
        self.listener.set_nonblocking(true)?;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let listener = self.listener;
        let handle = thread::Builder::new()
            .name("gazekey-accept".to_string())
            .spawn(move || accept_loop(listener, tx, stop_flag))?;
        tracing::info!(target: "gazekey::stream", addr = %self.local_addr, "listening for labels");
        Ok(ServerHandle {
            stop,
            handle: Some(handle),
            local_addr: self.local_addr,
        })
    }
}

/// Stops the accept loop on `shutdown` or drop. Reader threads finish when
/// their producer disconnects.
pub struct ServerHandle {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn accept_loop(listener: TcpListener, tx: Sender<StreamEvent>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(err) = start_connection(stream, peer, tx.clone()) {
                    tracing::warn!(target: "gazekey::stream", %peer, error = %err, "failed to start reader");
                }
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                tracing::warn!(target: "gazekey::stream", error = %err, "accept failed");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
    log_debug("label accept loop stopped");
}

fn start_connection(stream: TcpStream, peer: SocketAddr, tx: Sender<StreamEvent>) -> io::Result<()> {
    // Accepted sockets may inherit the listener's non-blocking mode on some platforms.
    stream.set_nonblocking(false)?;
    let _ = stream.set_nodelay(true);
    spawn_line_reader(stream, peer.to_string(), tx)?;
    Ok(())
}

/// Forward framed lines from `reader` into `tx`, bracketed by connect and
/// disconnect events. Used for TCP producers and for stdin.
pub fn spawn_line_reader<R>(
    reader: R,
    peer: String,
    tx: Sender<StreamEvent>,
) -> io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("gazekey-reader-{peer}"))
        .spawn(move || {
            tracing::info!(target: "gazekey::stream", %peer, "producer connected");
            if tx.send(StreamEvent::Connected(peer.clone())).is_err() {
                return;
            }
            for line in LineReader::new(reader) {
                match line {
                    Ok(label) => {
                        if tx.send(StreamEvent::Line(label)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(target: "gazekey::stream", %peer, error = %err, "read failed");
                        break;
                    }
                }
            }
            tracing::info!(target: "gazekey::stream", %peer, "producer disconnected");
            let _ = tx.send(StreamEvent::Disconnected(peer));
        })
}
