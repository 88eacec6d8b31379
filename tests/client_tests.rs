//! Client Tests
//!
//! End-to-end scenarios against a scripted fake server: authentication,
//! response shapes, error mapping, pipelining and reconnection.

mod common;

use std::sync::Arc;

use queued_client::{Client, ClientError};

use common::{handshake, read_line, send_line, TestServer};

// =============================================================================
// Handshake & Simple Commands
// =============================================================================

#[test]
fn test_version() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        assert_eq!(read_line(&mut reader), "version");
        send_line(&mut writer, "251 2.1.0");
    });

    let client = Client::new(common::config(server.port));
    assert_eq!(client.version().unwrap(), "2.1.0");
    server.join();
}

#[test]
fn test_protocol_error_carries_server_text() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        assert_eq!(read_line(&mut reader), "play nonexistent.mp3");
        send_line(&mut writer, "550 no such track");
    });

    let client = Client::new(common::config(server.port));
    match client.play("nonexistent.mp3") {
        Err(ClientError::Protocol(text)) => assert!(text.contains("no such track")),
        other => panic!("expected protocol error, got {:?}", other.map(|_| ())),
    }
    server.join();
}

#[test]
fn test_optional_absent_value() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        assert_eq!(read_line(&mut reader), "get track.mp3 missingpref");
        send_line(&mut writer, "555");
    });

    let client = Client::new(common::config(server.port));
    assert_eq!(client.get("track.mp3", "missingpref").unwrap(), None);
    server.join();
}

#[test]
fn test_optional_present_value() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        assert_eq!(read_line(&mut reader), "get track.mp3 weight");
        send_line(&mut writer, "252 90000");
    });

    let client = Client::new(common::config(server.port));
    assert_eq!(
        client.get("track.mp3", "weight").unwrap().as_deref(),
        Some("90000")
    );
    server.join();
}

#[test]
fn test_quoted_arguments_on_the_wire() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        assert_eq!(read_line(&mut reader), r#"play "blues no 1.ogg""#);
        send_line(&mut writer, "252 Z0001");
    });

    let client = Client::new(common::config(server.port));
    assert_eq!(client.play("blues no 1.ogg").unwrap(), "Z0001");
    server.join();
}

// =============================================================================
// Bodies
// =============================================================================

#[test]
fn test_body_with_dotted_line() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        assert_eq!(read_line(&mut reader), "playlists");
        send_line(&mut writer, "253 playlists follow");
        send_line(&mut writer, "x");
        send_line(&mut writer, ".dotfile");
        send_line(&mut writer, ".");
    });

    let client = Client::new(common::config(server.port));
    assert_eq!(client.playlists().unwrap(), vec!["x", "dotfile"]);
    server.join();
}

#[test]
fn test_playlist_set_sends_stuffed_body() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        assert_eq!(read_line(&mut reader), "playlist-set mylist");
        assert_eq!(read_line(&mut reader), "a");
        assert_eq!(read_line(&mut reader), "..b");
        assert_eq!(read_line(&mut reader), ".");
        send_line(&mut writer, "250 ok");
    });

    let client = Client::new(common::config(server.port));
    let contents = vec!["a".to_string(), ".b".to_string()];
    client.playlist_set("mylist", &contents).unwrap();
    server.join();
}

// =============================================================================
// Pipelining
// =============================================================================

#[test]
fn test_pipelined_commands_stay_correlated() {
    const THREADS: usize = 8;
    const COMMANDS: usize = 5;

    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        for _ in 0..THREADS * COMMANDS {
            let line = read_line(&mut reader);
            let tag = line.strip_prefix("part ").expect("unexpected command");
            // Replies go out in exactly the order requests arrived
            send_line(&mut writer, &format!("252 {}", tag));
        }
    });

    let client = Arc::new(Client::new(common::config(server.port)));
    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let client = Arc::clone(&client);
            std::thread::spawn(move || {
                for c in 0..COMMANDS {
                    let tag = format!("t{}c{}", t, c);
                    let reply = client
                        .execute(format!("part {}", tag))
                        .unwrap()
                        .value()
                        .unwrap()
                        .to_string();
                    assert_eq!(reply, tag);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    server.join();
}

// =============================================================================
// Reconnection
// =============================================================================

#[test]
fn test_reconnect_after_server_drop() {
    let server = TestServer::start(|listener| {
        // First connection: answer once, then drop the socket
        {
            let (stream, _) = listener.accept().unwrap();
            let (mut reader, mut writer) = handshake(stream);
            assert_eq!(read_line(&mut reader), "version");
            send_line(&mut writer, "251 1.0");
        }
        // Second connection: full handshake again
        let (stream, _) = listener.accept().unwrap();
        let (mut reader, mut writer) = handshake(stream);
        assert_eq!(read_line(&mut reader), "version");
        send_line(&mut writer, "251 2.0");
    });

    let client = Client::new(common::config(server.port));
    assert_eq!(client.version().unwrap(), "1.0");

    // The dead socket surfaces as a transport error once...
    let err = client.version().unwrap_err();
    assert!(err.is_transport(), "expected transport error, got {}", err);

    // ...and the next command reconnects and re-authenticates
    assert_eq!(client.version().unwrap(), "2.0");
    server.join();
}

// =============================================================================
// Handshake Failures
// =============================================================================

#[test]
fn test_authentication_rejected() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = std::io::BufReader::new(stream);
        send_line(&mut writer, &format!("231 2 sha256 {}", common::CHALLENGE));
        let _login = read_line(&mut reader);
        send_line(&mut writer, "530 authentication failure");
    });

    let client = Client::new(common::config(server.port));
    match client.version() {
        Err(ClientError::Protocol(text)) => {
            assert!(text.contains("authentication failed"));
            assert!(text.contains("530"));
        }
        other => panic!("expected protocol error, got {:?}", other.map(|_| ())),
    }
    server.join();
}

#[test]
fn test_unknown_protocol_generation() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        send_line(&mut writer, "231 3 sha256 00ff10e3");
    });

    let client = Client::new(common::config(server.port));
    assert!(matches!(
        client.version().unwrap_err(),
        ClientError::Parse(_)
    ));
    server.join();
}

#[test]
fn test_unknown_digest_algorithm() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        send_line(&mut writer, "231 2 blowfish 00ff10e3");
    });

    let client = Client::new(common::config(server.port));
    assert!(matches!(
        client.version().unwrap_err(),
        ClientError::Parse(_)
    ));
    server.join();
}

#[test]
fn test_unexpected_greeting_code() {
    let server = TestServer::start(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        send_line(&mut writer, "500 temporarily broken");
    });

    let client = Client::new(common::config(server.port));
    match client.version() {
        Err(ClientError::Protocol(text)) => assert!(text.contains("temporarily broken")),
        other => panic!("expected protocol error, got {:?}", other.map(|_| ())),
    }
    server.join();
}
