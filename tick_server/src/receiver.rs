use crate::provider::TickProvider;
use log::{debug, error, info, warn};
use std::io::{BufReader, ErrorKind};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tick_common::net::{MAX_REQUEST_LEN, read_message_with_limit, write_message};
use tick_common::{Method, ProviderError, Request, Response};

/// How often the accept loop checks for a stop request while no client connects.
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// An accepted client connection served by its own thread.
struct Connection {
    peer: SocketAddr,
    stream: TcpStream,
    handle: JoinHandle<()>,
}

/// TCP receiver exposing the provider's methods to remote callers.
///
/// Each accepted connection gets a thread that reads newline-delimited JSON
/// `Request`s and answers every one of them with a `Response`. A malformed
/// request is answered with `Response::Error`; it never affects other clients.
pub struct RpcReceiver {
    /// The underlying TCP listening socket.
    pub(crate) socket: TcpListener,
}

impl RpcReceiver {
    /// Bind a new TCP receiver to the provided `bind_addr` (e.g., `0.0.0.0:9090`).
    pub fn new(bind_addr: &str) -> Result<Self, ProviderError> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Address the receiver is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, ProviderError> {
        Ok(self.socket.local_addr()?)
    }

    /// Accepts connections until the provider's stop signal is set.
    ///
    /// On the way out every open connection is closed for reading, so idle clients
    /// are released, and its thread is joined. A response that is still being
    /// produced (such as the answer to `shutdown`) is written before the join returns.
    pub fn receive_loop(self, provider: Arc<TickProvider>) -> Result<(), ProviderError> {
        let lifecycle = provider.lifecycle();
        self.socket.set_nonblocking(true)?;
        info!("RPC server is started on {}", self.socket.local_addr()?);

        let mut connections: Vec<Connection> = Vec::new();
        loop {
            match self.socket.accept() {
                Ok((stream, peer)) => {
                    debug!("Client connected: {}", peer);
                    connections.retain(|c| !c.handle.is_finished());
                    match spawn_connection(stream, peer, Arc::clone(&provider)) {
                        Ok(connection) => connections.push(connection),
                        Err(e) => error!("Failed to serve client {}: {}", peer, e),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if lifecycle.wait_timeout(ACCEPT_POLL_INTERVAL) {
                        break;
                    }
                }
                Err(e) => {
                    error!("TCP connection error: {}", e);
                    if lifecycle.wait_timeout(ACCEPT_POLL_INTERVAL) {
                        break;
                    }
                }
            }
        }

        for connection in connections {
            let _ = connection.stream.shutdown(Shutdown::Read);
            if connection.handle.join().is_err() {
                error!("Connection thread for {} panicked", connection.peer);
            }
        }
        info!("RPC server stopped");
        Ok(())
    }
}

fn spawn_connection(
    stream: TcpStream,
    peer: SocketAddr,
    provider: Arc<TickProvider>,
) -> Result<Connection, ProviderError> {
    // Accepted sockets may inherit the listener's non-blocking mode on some platforms.
    stream.set_nonblocking(false)?;
    let control = stream.try_clone()?;
    let handle = thread::Builder::new()
        .name(format!("rpc-{peer}"))
        .spawn(move || {
            if let Err(e) = serve_connection(&stream, &provider) {
                warn!("Connection with {} closed with error: {}", peer, e);
            } else {
                debug!("Client disconnected: {}", peer);
            }
            // The receiver still holds a clone; close the socket so the peer sees EOF.
            let _ = stream.shutdown(Shutdown::Both);
        })?;
    Ok(Connection {
        peer,
        stream: control,
        handle,
    })
}

/// Answers requests arriving on `stream` until the peer closes it.
///
/// Undecodable lines (bad JSON, invalid UTF-8, longer than `MAX_REQUEST_LEN`) are
/// answered with `Response::Error` and the connection keeps serving.
fn serve_connection(stream: &TcpStream, provider: &TickProvider) -> Result<(), ProviderError> {
    let mut reader = BufReader::new(stream);
    let mut writer = stream;
    loop {
        let response = match read_message_with_limit::<_, Request>(&mut reader, MAX_REQUEST_LEN) {
            Ok(Some(request)) => {
                debug!("Received request {}", request.method);
                dispatch(provider, request.method)
            }
            Ok(None) => return Ok(()),
            Err(e @ (ProviderError::SerdeJson(_) | ProviderError::MessageTooLong(_))) => {
                warn!("Malformed request: {}", e);
                Response::Error(format!("malformed request: {e}"))
            }
            Err(ProviderError::Io(e)) if e.kind() == ErrorKind::InvalidData => {
                warn!("Malformed request: {}", e);
                Response::Error(format!("malformed request: {e}"))
            }
            Err(e) => return Err(e),
        };
        write_message(&mut writer, &response)?;
    }
}

/// Invokes `method` on the provider and wraps the outcome in a `Response`.
pub fn dispatch(provider: &TickProvider, method: Method) -> Response {
    let result = match method {
        Method::GetCurrentPrice => provider.get_current_price().map(Response::Price),
        Method::GetTicks => provider.get_ticks().map(Response::Ticks),
        Method::Shutdown => provider.shutdown().map(|()| Response::ShutdownComplete),
    };
    result.unwrap_or_else(|e| {
        error!("{} failed: {}", method, e);
        Response::Error(e.to_string())
    })
}
