use shardnet::*;
use std::io::Read;
use std::net::TcpListener;
use std::time::Duration;

#[test]
fn open_send_close_cycle() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let reader = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        buf
    });

    let mut sender = TunedSender::new(&EngineConfig::default())
        .with_connect_timeout(Duration::from_secs(2));
    assert!(!sender.is_open());
    sender.open("127.0.0.1", port).unwrap();
    assert!(sender.is_open());
    // A second open keeps the existing connection.
    sender.open("127.0.0.1", port).unwrap();
    assert_eq!(sender.peer().unwrap().port(), port);

    let payload = vec![7u8; 256 * 1024];
    sender.send(&payload).unwrap();
    sender.send(b"tail").unwrap();
    sender.close().unwrap();
    sender.close().unwrap();
    assert!(!sender.is_open());

    let got = reader.join().unwrap();
    assert_eq!(got.len(), payload.len() + 4);
    assert!(got[..payload.len()].iter().all(|b| *b == 7));
    assert_eq!(&got[payload.len()..], b"tail");
}

#[test]
fn send_on_closed_sender_fails() {
    let mut sender = TunedSender::new(&EngineConfig::default());
    assert!(matches!(sender.send(b"x"), Err(EngineError::SenderClosed)));
}

#[test]
fn refused_connection_is_reported() {
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let mut sender = TunedSender::new(&EngineConfig::default());
    assert!(matches!(
        sender.open("127.0.0.1", port),
        Err(EngineError::ConnectFailed { .. })
    ));
    assert!(!sender.is_open());
}
