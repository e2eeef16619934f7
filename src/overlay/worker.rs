//! Render thread and its mailbox
//!
//! The mailbox keeps control messages (init/resize) in order but holds at
//! most one pending frame: posting a frame while one is waiting replaces it.
//! A renderer that falls behind therefore always skips to the newest state
//! instead of queueing stale work.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use super::draw::OverlayPainter;
use super::frame::{OverlayFrame, OverlayMessage};
use super::surface::Surface;

#[derive(Default)]
struct MailboxState {
    control: VecDeque<OverlayMessage>,
    pending_frame: Option<Box<OverlayFrame>>,
    dropped_frames: u64,
    shutdown: bool,
}

#[derive(Default)]
struct Mailbox {
    state: Mutex<MailboxState>,
    signal: Condvar,
}

impl Mailbox {
    fn post(&self, message: OverlayMessage) {
        let mut state = self.state.lock().unwrap();
        match message {
            OverlayMessage::Frame(frame) => {
                if state.pending_frame.replace(frame).is_some() {
                    state.dropped_frames += 1;
                }
            }
            control => state.control.push_back(control),
        }
        drop(state);
        self.signal.notify_one();
    }

    /// Block until there is work, then take all of it at once
    fn take(&self) -> (Vec<OverlayMessage>, Option<Box<OverlayFrame>>, bool) {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.shutdown || !state.control.is_empty() || state.pending_frame.is_some() {
                let control = state.control.drain(..).collect();
                let frame = state.pending_frame.take();
                return (control, frame, state.shutdown);
            }
            state = self.signal.wait(state).unwrap();
        }
    }

    fn request_shutdown(&self) {
        self.state.lock().unwrap().shutdown = true;
        self.signal.notify_one();
    }
}

/// Host-side handle to the render thread. Dropping it shuts the thread down.
pub struct OverlayHandle {
    mailbox: Arc<Mailbox>,
    thread: Option<JoinHandle<()>>,
}

impl OverlayHandle {
    pub fn init(&self, width: u32, height: u32) {
        self.mailbox.post(OverlayMessage::Init { width, height });
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.mailbox.post(OverlayMessage::Resize { width, height });
    }

    /// Post a frame snapshot. Never blocks; replaces any frame still waiting.
    pub fn post_frame(&self, frame: OverlayFrame) {
        self.mailbox.post(OverlayMessage::Frame(Box::new(frame)));
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.mailbox.request_shutdown();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("overlay render thread panicked");
            }
        }
    }
}

impl Drop for OverlayHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop();
        }
    }
}

/// Start the render thread. `sink` is called with the composited surface
/// after every rendered frame; presenting it is the host's business.
pub fn spawn_overlay_renderer<F>(mut sink: F) -> OverlayHandle
where
    F: FnMut(&Surface) + Send + 'static,
{
    let mailbox = Arc::new(Mailbox::default());
    let worker_mailbox = Arc::clone(&mailbox);
    let thread = thread::Builder::new()
        .name("overlay-render".into())
        .spawn(move || {
            let mut painter = OverlayPainter::new();
            loop {
                let (control, frame, shutdown) = worker_mailbox.take();
                for message in control {
                    painter.handle(message);
                }
                if let Some(frame) = frame {
                    painter.render(&frame);
                    sink(painter.surface());
                }
                if shutdown {
                    let dropped = worker_mailbox.state.lock().unwrap().dropped_frames;
                    if dropped > 0 {
                        log::debug!("overlay renderer dropped {dropped} stale frames");
                    }
                    break;
                }
            }
        })
        .expect("failed to spawn overlay render thread");
    OverlayHandle {
        mailbox,
        thread: Some(thread),
    }
}
