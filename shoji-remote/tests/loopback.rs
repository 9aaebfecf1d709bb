//! End-to-end session over a real socket pair: a server-side remote
//! console talking to a client relay backed by a grid console.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use shoji_console::{Console, KeyEvent, LocalConsole};
use shoji_core::{ansi_color, ScreenBuffer, SharedScreen, TextAttributes};
use shoji_remote::{ClientExit, RemoteConsole, RemoteConsoleClient};

fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).expect("connect");
    let (server, _) = listener.accept().expect("accept");
    (server, client)
}

#[test]
fn full_session_round_trip() {
    let (server_stream, client_stream) = socket_pair();

    // Server half: an invisible console over the socket.
    let server = Arc::new(RemoteConsole::new(
        server_stream.try_clone().expect("clone stream"),
        server_stream,
    ));

    // Client half: a real grid console driven by key events.
    let screen = SharedScreen::new(ScreenBuffer::new(40, 5, 20));
    let local = Arc::new(LocalConsole::new(screen.clone()));
    let local_dyn: Arc<dyn Console> = local.clone();
    let relay = RemoteConsoleClient::new(
        local_dyn,
        client_stream.try_clone().expect("clone stream"),
        client_stream,
    );
    let relay_handle = thread::spawn(move || relay.run());

    // Server session: prompt, switch colors, ask for a line.
    let session = Arc::clone(&server);
    let session_handle = thread::spawn(move || {
        session.try_write("login: ").expect("write prompt");
        session
            .try_set_attributes(TextAttributes::shared(
                ansi_color(2, true),
                ansi_color(0, false),
            ))
            .expect("set attributes");
        session.try_read_line(false).expect("read answer")
    });

    // The request frame makes the client block in read_line; type the
    // answer once edit mode is live.
    for _ in 0..500 {
        if local.is_reading() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    assert!(local.is_reading(), "client never entered edit mode");
    for c in "alice".chars() {
        local.handle_key(&KeyEvent::Char(c));
    }
    local.handle_key(&KeyEvent::Enter);

    assert_eq!(session_handle.join().unwrap(), "alice");

    // The prompt crossed the wire and the typed echo followed it.
    let first_row = screen.lock().visible_text()[0].clone();
    assert!(
        first_row.starts_with("login: alice"),
        "unexpected first row: {first_row:?}"
    );

    // The color frame landed as the local console's attributes.
    assert_eq!(
        local.attributes().foreground(),
        ansi_color(2, true),
        "foreground frame not applied"
    );

    // Dropping the server ends the client session.
    drop(server);
    match relay_handle.join().unwrap() {
        Ok(ClientExit::PeerClosed) => {}
        other => panic!("expected PeerClosed, got {other:?}"),
    }
}

#[test]
fn half_close_is_fatal_to_the_session() {
    let (server_stream, client_stream) = socket_pair();

    let screen = SharedScreen::new(ScreenBuffer::new(20, 3, 10));
    let local: Arc<dyn Console> = Arc::new(LocalConsole::new(screen));
    let relay = RemoteConsoleClient::new(
        local,
        client_stream.try_clone().expect("clone stream"),
        client_stream,
    );
    let handle = thread::spawn(move || relay.run());

    // Server vanishes without a word.
    drop(server_stream);

    match handle.join().unwrap() {
        Ok(ClientExit::PeerClosed) => {}
        other => panic!("expected PeerClosed, got {other:?}"),
    }
}
