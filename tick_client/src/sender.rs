//! Calling the tick provider over TCP.
//!
//! `RpcClient` keeps one connection open and sends one JSON request line per call,
//! waiting for the matching response line. Error responses from the server surface
//! as `ProviderError::Remote`.
use log::{debug, error};
use std::io::BufReader;
use std::net::TcpStream;
use tick_common::net::{read_message, write_message};
use tick_common::{Method, ProviderError, Quote, Request, Response, Tick};

/// Connection to a tick provider.
pub struct RpcClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl RpcClient {
    /// Connects to the provider at `address` (`ip:port`).
    pub fn connect(address: &str) -> Result<Self, ProviderError> {
        let stream = TcpStream::connect(address).inspect_err(|e| {
            error!("Failed to connect to server {}: {}", address, e);
        })?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: stream,
        })
    }

    /// Sends `method` and waits for the server's answer.
    pub fn call(&mut self, method: Method) -> Result<Response, ProviderError> {
        debug!("Calling {}", method);
        write_message(&mut self.writer, &Request::new(method))?;
        match read_message(&mut self.reader)? {
            Some(Response::Error(message)) => Err(ProviderError::Remote(message)),
            Some(response) => Ok(response),
            None => Err(ProviderError::ChannelRecv(format!(
                "server closed the connection before answering {method}"
            ))),
        }
    }

    /// Latest bid/ask pair.
    pub fn get_current_price(&mut self) -> Result<Quote, ProviderError> {
        match self.call(Method::GetCurrentPrice)? {
            Response::Price(quote) => Ok(quote),
            other => Err(unexpected(Method::GetCurrentPrice, &other)),
        }
    }

    /// Most recent ticks, oldest first.
    pub fn get_ticks(&mut self) -> Result<Vec<Tick>, ProviderError> {
        match self.call(Method::GetTicks)? {
            Response::Ticks(ticks) => Ok(ticks),
            other => Err(unexpected(Method::GetTicks, &other)),
        }
    }

    /// Stops the provider; returns once its background threads have exited.
    pub fn shutdown(&mut self) -> Result<(), ProviderError> {
        match self.call(Method::Shutdown)? {
            Response::ShutdownComplete => Ok(()),
            other => Err(unexpected(Method::Shutdown, &other)),
        }
    }
}

fn unexpected(method: Method, response: &Response) -> ProviderError {
    ProviderError::Format(format!("unexpected answer to {method}: {response:?}"))
}
