//! TCP server forwarding request lines to the session thread

use std::{
    io::{self, BufRead, BufReader, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    thread::JoinHandle,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    defaults::MAX_LINE_LENGTH,
    protocol::{parse_request, Response},
    render_thread::SessionSender,
};

pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Sender<()>,
    thread: JoinHandle<()>,
}

impl ServerHandle {
    /// Block until the accept loop ends
    pub fn join(self) {
        if self.thread.join().is_err() {
            log::error!("Server thread panicked");
        }
    }

    /// Stop accepting connections, open connections finish on their own
    pub fn shut_down(self) {
        let _ = self.shutdown.send(());
        self.join();
    }
}

/// Bind `address` and accept connections on a background thread
///
/// Port 0 picks a free port, see [`ServerHandle::addr`].
pub fn start_server(address: &str, session: SessionSender) -> io::Result<ServerHandle> {
    let listener = TcpListener::bind(address)?;
    let addr = listener.local_addr()?;
    // Non-blocking so the loop can notice shutdown
    listener.set_nonblocking(true)?;

    let (shutdown, shutdown_recv) = crossbeam_channel::bounded(1);
    let thread = std::thread::spawn(move || accept_loop(listener, session, shutdown_recv));

    log::info!("Listening on {addr}");
    Ok(ServerHandle {
        addr,
        shutdown,
        thread,
    })
}

fn accept_loop(listener: TcpListener, session: SessionSender, shutdown: Receiver<()>) {
    loop {
        if shutdown.try_recv().is_ok() {
            break;
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                log::debug!("Connection from {peer}");
                let session = session.clone();
                std::thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, session) {
                        log::warn!("Connection {peer} closed: {e}");
                    }
                });
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) => log::error!("Accept error: {e}"),
        }
    }
}

/// Answer one request line
pub fn handle_line(line: &str, session: &SessionSender) -> Response {
    match parse_request(line) {
        Ok(request) => session.request(request),
        Err(e) => {
            log::warn!("Ignoring request: {e}");
            Response::error(e)
        }
    }
}

fn handle_connection(stream: TcpStream, session: SessionSender) -> io::Result<()> {
    // Accepted streams may inherit non-blocking mode
    stream.set_nonblocking(false)?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut line = String::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_LINE_LENGTH as u64)
            .read_line(&mut line)?;
        if read == 0 {
            return Ok(());
        }

        if !line.ends_with('\n') && read == MAX_LINE_LENGTH {
            let response = Response::error("request line too long");
            writeln!(writer, "{}", response.to_line())?;
            return Ok(());
        }

        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&line, &session);
        writeln!(writer, "{}", response.to_line())?;
        if let Some(payload) = &response.payload {
            writer.write_all(payload)?;
        }
        writer.flush()?;
    }
}
