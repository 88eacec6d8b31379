//! Shared fake-server scaffolding for integration tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::JoinHandle;
use std::time::Duration;

use queued_client::Config;

pub const USERNAME: &str = "testuser";
pub const PASSWORD: &str = "mypass";
pub const CHALLENGE: &str = "00ff10e3";

/// sha256("mypass" ++ hex-decoded challenge), computed independently
pub const LOGIN_DIGEST: &str = "43724553e7adf2ded4bc9fb2af8292fcb329d5bdbabfe493712094601c0e0bb9";

/// A scripted server running in a background thread.
pub struct TestServer {
    pub port: u16,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind an ephemeral port and hand the listener to `serve`.
    pub fn start<F>(serve: F) -> Self
    where
        F: FnOnce(TcpListener) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let port = listener.local_addr().expect("local addr").port();
        let handle = std::thread::spawn(move || serve(listener));
        Self { port, handle }
    }

    pub fn join(self) {
        self.handle.join().expect("test server panicked");
    }
}

/// Client config pointed at the test server.
pub fn config(port: u16) -> Config {
    Config::builder()
        .host("127.0.0.1")
        .port(port)
        .username(USERNAME)
        .password(PASSWORD)
        .retry_interval(Duration::from_millis(10))
        .build()
}

/// Read one line from the client, without the newline.
pub fn read_line(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read from client");
    if line.ends_with('\n') {
        line.pop();
    }
    line
}

pub fn send_line(stream: &mut TcpStream, line: &str) {
    stream
        .write_all(format!("{}\n", line).as_bytes())
        .expect("write to client");
    stream.flush().expect("flush to client");
}

/// Run the greeting/login exchange, asserting the client's digest.
pub fn handshake(stream: TcpStream) -> (BufReader<TcpStream>, TcpStream) {
    let mut writer = stream.try_clone().expect("clone test stream");
    let mut reader = BufReader::new(stream);
    send_line(&mut writer, &format!("231 2 sha256 {}", CHALLENGE));
    let login = read_line(&mut reader);
    assert_eq!(login, format!("user {} {}", USERNAME, LOGIN_DIGEST));
    send_line(&mut writer, "230 ok");
    (reader, writer)
}
