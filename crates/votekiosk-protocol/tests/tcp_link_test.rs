//! Integration tests for the TCP host link.
//!
//! A host task on a real loopback socket talks to the kiosk side through
//! `AnyChannel`, the way the `votekiosk` binary wires it up.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use votekiosk_core::{Button, Command, Error, Event, Identifier};
use votekiosk_protocol::{AnyChannel, LineCodec, MessageChannel};

/// Poll the non-blocking read until a line shows up.
async fn read_line_within(channel: &mut AnyChannel, limit: Duration) -> Option<String> {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if let Some(line) = channel.try_read_line().await.unwrap() {
            return Some(line);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    None
}

async fn connected_pair() -> (AnyChannel, Framed<TcpStream, LineCodec>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let host = TcpStream::connect(addr).await.unwrap();
    let (kiosk, _) = listener.accept().await.unwrap();

    (AnyChannel::from(kiosk), Framed::new(host, LineCodec::new()))
}

#[tokio::test]
async fn test_kiosk_events_reach_host() {
    let (mut kiosk, mut host) = connected_pair().await;
    let id = Identifier::from_hex("9E863AAA").unwrap();

    kiosk.send_event(&Event::Ready).await.unwrap();
    kiosk.send_event(&Event::Check(id)).await.unwrap();
    kiosk.send_event(&Event::Vote(Button::Two)).await.unwrap();

    assert_eq!(host.next().await.unwrap().unwrap(), "READY");
    assert_eq!(host.next().await.unwrap().unwrap(), "CHECK:9E863AAA");
    assert_eq!(host.next().await.unwrap().unwrap(), "VOTE:2");
}

#[tokio::test]
async fn test_host_commands_reach_kiosk() {
    let (mut kiosk, mut host) = connected_pair().await;

    host.send("ALLOW".to_string()).await.unwrap();
    host.send("  FOO  ".to_string()).await.unwrap();

    let line = read_line_within(&mut kiosk, Duration::from_secs(2)).await.unwrap();
    assert_eq!(Command::parse(&line), Command::Allow);

    let line = read_line_within(&mut kiosk, Duration::from_secs(2)).await.unwrap();
    assert_eq!(line, "FOO");
    assert!(!Command::parse(&line).is_known());
}

#[tokio::test]
async fn test_crlf_from_host_is_stripped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut host = TcpStream::connect(addr).await.unwrap();
    let (stream, _) = listener.accept().await.unwrap();
    let mut kiosk = AnyChannel::from(stream);

    tokio::io::AsyncWriteExt::write_all(&mut host, b"RESET_CARD\r\n")
        .await
        .unwrap();

    let line = read_line_within(&mut kiosk, Duration::from_secs(2)).await;
    assert_eq!(line.as_deref(), Some("RESET_CARD"));
}

#[tokio::test]
async fn test_host_disconnect_closes_channel() {
    let (mut kiosk, host) = connected_pair().await;
    drop(host);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        match kiosk.try_read_line().await {
            Err(Error::ChannelClosed) => break,
            Ok(None) if tokio::time::Instant::now() < deadline => {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            other => panic!("Expected ChannelClosed, got {other:?}"),
        }
    }
}
