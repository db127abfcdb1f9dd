// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aro_core::{Event, EventPublisher};

use super::*;

struct RecordingPublisher {
    connected: AtomicUsize,
    data: Mutex<Vec<Vec<u8>>>,
    disconnected: AtomicUsize,
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) {
        match event {
            Event::ClientConnected { .. } => {
                self.connected.fetch_add(1, Ordering::SeqCst);
            }
            Event::DataReceived { payload, .. } => {
                self.data.lock().push(payload);
            }
            Event::ClientDisconnected { .. } => {
                self.disconnected.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

#[test]
fn client_connect_send_and_disconnect_publish_the_expected_events() {
    let recorder = Arc::new(RecordingPublisher {
        connected: AtomicUsize::new(0),
        data: Mutex::new(Vec::new()),
        disconnected: AtomicUsize::new(0),
    });
    let mut server = TcpServer::start("echo", 0, Arc::clone(&recorder) as Arc<dyn EventPublisher>).expect("server should bind");
    let addr = server.local_addr();

    let mut stream = TcpStream::connect(addr).expect("client should connect");
    stream.write_all(b"hello").expect("write should succeed");
    stream.flush().expect("flush should succeed");

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while recorder.data.lock().is_empty() && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(recorder.connected.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.data.lock().first().map(|v| v.as_slice()), Some(b"hello".as_slice()));

    drop(stream);
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while recorder.disconnected.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(recorder.disconnected.load(Ordering::SeqCst), 1);

    server.stop();
}

#[test]
fn send_to_unknown_connection_fails() {
    let recorder: Arc<dyn EventPublisher> = Arc::new(RecordingPublisher {
        connected: AtomicUsize::new(0),
        data: Mutex::new(Vec::new()),
        disconnected: AtomicUsize::new(0),
    });
    let mut server = TcpServer::start("echo", 0, recorder).expect("server should bind");
    let handle = aro_core::OpaqueHandle::new("tcp", 999);
    assert!(server.send(&handle, b"hi").is_err());
    server.stop();
}
