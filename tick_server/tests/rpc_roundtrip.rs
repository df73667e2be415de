use std::io::{BufReader, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tick_common::net::{MAX_REQUEST_LEN, read_message, write_message};
use tick_common::{Method, Request, Response};
use tick_server::{LifecycleState, ProviderConfig, RpcReceiver, TickProvider};

struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .expect("read timeout");
        Self {
            reader: BufReader::new(stream.try_clone().expect("clone stream")),
            writer: stream,
        }
    }

    fn call(&mut self, method: Method) -> Response {
        write_message(&mut self.writer, &Request::new(method)).expect("send request");
        read_message(&mut self.reader)
            .expect("read response")
            .expect("connection closed")
    }
}

#[test]
fn remote_calls_reach_the_provider() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ProviderConfig {
        min_tick_interval: Duration::from_millis(1),
        max_tick_interval: Duration::from_millis(2),
        snapshot_period: Duration::from_secs(60),
        snapshot_dir: dir.path().to_path_buf(),
        ..ProviderConfig::default()
    };
    let provider = Arc::new(TickProvider::start(config).expect("start provider"));
    let receiver = RpcReceiver::new("127.0.0.1:0").expect("bind");
    let addr = receiver.local_addr().expect("local addr");
    let receiver_provider = Arc::clone(&provider);
    let receiver_thread = thread::spawn(move || receiver.receive_loop(receiver_provider));

    let mut client = Client::connect(addr);

    match client.call(Method::GetCurrentPrice) {
        Response::Price(quote) => assert!(quote.ask >= quote.bid),
        other => panic!("unexpected response {other:?}"),
    }

    thread::sleep(Duration::from_millis(100));
    match client.call(Method::GetTicks) {
        Response::Ticks(ticks) => {
            assert!(!ticks.is_empty() && ticks.len() <= 100);
            assert!(ticks.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

            let payload = serde_json::to_value(&ticks).expect("encode ticks");
            let first = &payload.as_array().expect("array")[0];
            assert!(first["timestamp"].is_string());
            assert!(first["bid"].is_f64());
            assert!(first["ask"].is_f64());
        }
        other => panic!("unexpected response {other:?}"),
    }

    // A malformed line gets an error answer and the connection stays usable.
    client.writer.write_all(b"{\"method\":\"format_disk\"}\n").unwrap();
    let answer: Response = read_message(&mut client.reader).unwrap().unwrap();
    assert!(matches!(answer, Response::Error(_)));

    let mut other_client = Client::connect(addr);
    assert_eq!(other_client.call(Method::Shutdown), Response::ShutdownComplete);
    assert_eq!(provider.state(), LifecycleState::Stopped);

    receiver_thread
        .join()
        .expect("receiver panicked")
        .expect("receiver failed");
}

#[test]
fn idle_clients_do_not_block_receiver_exit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ProviderConfig {
        snapshot_dir: dir.path().to_path_buf(),
        ..ProviderConfig::default()
    };
    let provider = Arc::new(TickProvider::start(config).expect("start provider"));
    let receiver = RpcReceiver::new("127.0.0.1:0").expect("bind");
    let addr = receiver.local_addr().expect("local addr");
    let receiver_provider = Arc::clone(&provider);
    let receiver_thread = thread::spawn(move || receiver.receive_loop(receiver_provider));

    let mut idle = Client::connect(addr);
    assert!(matches!(idle.call(Method::GetCurrentPrice), Response::Price(_)));

    provider.lifecycle().request_stop();
    provider.shutdown().expect("shutdown");
    receiver_thread
        .join()
        .expect("receiver panicked")
        .expect("receiver failed");

    let closed: Option<Response> = read_message(&mut idle.reader).expect("clean close");
    assert!(closed.is_none());
}

#[test]
fn undecodable_requests_get_error_answers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ProviderConfig {
        snapshot_dir: dir.path().to_path_buf(),
        ..ProviderConfig::default()
    };
    let provider = Arc::new(TickProvider::start(config).expect("start provider"));
    let receiver = RpcReceiver::new("127.0.0.1:0").expect("bind");
    let addr = receiver.local_addr().expect("local addr");
    let receiver_provider = Arc::clone(&provider);
    let receiver_thread = thread::spawn(move || receiver.receive_loop(receiver_provider));

    let mut client = Client::connect(addr);

    client.writer.write_all(b"{\"method\":\"\xff\xfe\"}\n").unwrap();
    let answer: Response = read_message(&mut client.reader).unwrap().unwrap();
    assert!(matches!(answer, Response::Error(_)), "got {answer:?}");
    assert!(matches!(client.call(Method::GetCurrentPrice), Response::Price(_)));

    let mut oversized = vec![b' '; MAX_REQUEST_LEN * 4];
    oversized.push(b'\n');
    client.writer.write_all(&oversized).unwrap();
    let answer: Response = read_message(&mut client.reader).unwrap().unwrap();
    assert!(matches!(answer, Response::Error(_)), "got {answer:?}");
    assert!(matches!(client.call(Method::GetCurrentPrice), Response::Price(_)));

    provider.lifecycle().request_stop();
    provider.shutdown().expect("shutdown");
    receiver_thread
        .join()
        .expect("receiver panicked")
        .expect("receiver failed");
}

#[test]
fn closed_connection_is_released_without_waiting_for_stop() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ProviderConfig {
        snapshot_dir: dir.path().to_path_buf(),
        ..ProviderConfig::default()
    };
    let provider = Arc::new(TickProvider::start(config).expect("start provider"));
    let receiver = RpcReceiver::new("127.0.0.1:0").expect("bind");
    let addr = receiver.local_addr().expect("local addr");
    let receiver_provider = Arc::clone(&provider);
    let receiver_thread = thread::spawn(move || receiver.receive_loop(receiver_provider));

    let mut client = Client::connect(addr);
    assert!(matches!(client.call(Method::GetCurrentPrice), Response::Price(_)));
    client
        .writer
        .shutdown(std::net::Shutdown::Write)
        .expect("half close");

    // The server ends its side as soon as the request stream ends.
    let closed: Option<Response> = read_message(&mut client.reader).expect("clean close");
    assert!(closed.is_none());
    assert_eq!(provider.state(), LifecycleState::Running);

    provider.lifecycle().request_stop();
    provider.shutdown().expect("shutdown");
    receiver_thread
        .join()
        .expect("receiver panicked")
        .expect("receiver failed");
}
