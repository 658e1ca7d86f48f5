use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Poll interval; also bounds how late feedback and auto-advance can fire.
pub const TICK_RATE: Duration = Duration::from_millis(50);

pub enum AppEvent {
    /// A key press and when it was read, so answer times don't include
    /// queueing behind a redraw.
    Key(KeyEvent, Instant),
    Tick(Instant),
    Resize,
}

/// Receives events from the input thread. The thread owns the only sender,
/// so if it stops, `next` fails instead of blocking.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let sent = match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        // Release and repeat events would double-type digits
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            tx.send(AppEvent::Key(key, Instant::now()))
                        }
                        Ok(Event::Resize(..)) => tx.send(AppEvent::Resize),
                        Ok(_) => Ok(()),
                        Err(e) => {
                            tracing::warn!("terminal read failed: {e}");
                            Ok(())
                        }
                    },
                    Ok(false) => tx.send(AppEvent::Tick(Instant::now())),
                    Err(e) => {
                        tracing::error!("terminal poll failed, stopping input thread: {e}");
                        return;
                    }
                };
                if sent.is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
