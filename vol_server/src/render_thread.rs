use std::{sync::Arc, thread::JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use omevol_lib::command::Command;
use parking_lot::Mutex;

use crate::{
    protocol::{FrameInfo, Request, Response},
    session::{Frame, Session},
};

pub type SharedFrame = Arc<Mutex<Frame>>;

pub enum SessionMessage {
    Command {
        command: Command,
        reply: Sender<Response>,
    },
    Status {
        reply: Sender<Response>,
    },
    ShutDown,
}

/// Handle for sending requests to the session thread
#[derive(Clone)]
pub struct SessionSender {
    messages: Sender<SessionMessage>,
    frame: SharedFrame,
}

impl SessionSender {
    /// Send `request` and wait for the answer
    ///
    /// `Frame` is answered from the last published frame without waiting for the session thread.
    pub fn request(&self, request: Request) -> Response {
        let (reply, answer) = crossbeam_channel::bounded(1);
        let message = match request {
            Request::Command(command) => SessionMessage::Command { command, reply },
            Request::Status => SessionMessage::Status { reply },
            Request::Frame => return Response::with_image(&self.frame.lock()),
        };

        if self.messages.send(message).is_err() {
            return Response::error("session thread is not running");
        }
        answer
            .recv()
            .unwrap_or_else(|_| Response::error("session thread is not running"))
    }

    pub fn shut_down(&self) {
        // thread already gone is fine
        let _ = self.messages.send(SessionMessage::ShutDown);
    }

    /// Copy of the last published frame
    pub fn frame(&self) -> Frame {
        self.frame.lock().clone()
    }
}

/// Owns the session, applies commands and renders between them
pub struct RenderThread {
    session: Session,
    frame: SharedFrame,
    message_sender: Sender<SessionMessage>,
    message_receiver: Receiver<SessionMessage>,
}

impl RenderThread {
    pub fn new(session: Session) -> Self {
        let (message_sender, message_receiver) = crossbeam_channel::unbounded();
        Self {
            frame: Arc::new(Mutex::new(session.snapshot())),
            session,
            message_sender,
            message_receiver,
        }
    }

    pub fn get_sender(&self) -> SessionSender {
        SessionSender {
            messages: self.message_sender.clone(),
            frame: self.frame.clone(),
        }
    }

    pub fn start(mut self) -> JoinHandle<()> {
        std::thread::spawn(move || {
            self.run();
            log::info!("Session thread finished");
        })
    }

    fn run(&mut self) {
        loop {
            // Apply everything pending before the next iteration
            loop {
                match self.message_receiver.try_recv() {
                    Ok(message) => {
                        if !self.handle_message(message) {
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            if self.session.is_idle() {
                match self.message_receiver.recv() {
                    Ok(message) => {
                        if !self.handle_message(message) {
                            return;
                        }
                    }
                    Err(_) => return,
                }
                continue;
            }

            self.session.render_step();
            if self.session.should_publish() {
                self.publish();
            }
        }
    }

    /// Returns `false` on shutdown
    fn handle_message(&mut self, message: SessionMessage) -> bool {
        match message {
            SessionMessage::Command { command, reply } => {
                let response = match self.session.execute(&command) {
                    Ok(()) => Response::success(self.session.iteration()),
                    Err(e) => {
                        log::warn!("Command {command:?} failed: {e}");
                        Response::error(e)
                    }
                };
                // client may have disconnected
                let _ = reply.send(response);
            }
            SessionMessage::Status { reply } => {
                let info = FrameInfo::from(&*self.frame.lock());
                let _ = reply.send(Response::with_frame(info));
            }
            SessionMessage::ShutDown => return false,
        }
        true
    }

    fn publish(&self) {
        let frame = self.session.snapshot();
        log::debug!(
            "Publishing frame {}x{}, iteration {}",
            frame.width,
            frame.height,
            frame.iteration
        );
        *self.frame.lock() = frame;
    }
}
