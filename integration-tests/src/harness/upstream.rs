use std::io::Write;
use std::net::TcpListener;
use std::thread;

/// Accept connections on an ephemeral port and answer each with a fixed
/// response. Returns the port.
pub fn start_upstream() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind upstream");
    let port = listener
        .local_addr()
        .expect("failed to read upstream address")
        .port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\nhello world");
        }
    });

    port
}
