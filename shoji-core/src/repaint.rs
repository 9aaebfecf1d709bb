//! Timer-driven repaint coalescing.
//!
//! Writes mark cells dirty; this pump flushes the accumulated rectangle to
//! the renderer at a bounded rate so a burst of output costs one repaint
//! instead of thousands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::sink::SharedScreen;

/// Default flush interval; comfortably inside a 60Hz frame.
pub const DEFAULT_REPAINT_INTERVAL: Duration = Duration::from_millis(15);

/// Background flusher for a [`SharedScreen`]. Stops on `stop()` or drop.
pub struct RepaintPump {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RepaintPump {
    pub fn start(screen: SharedScreen, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("repaint-pump".into())
            .spawn(move || {
                while !stop_flag.load(Ordering::Relaxed) {
                    screen.lock().flush_to_renderer();
                    thread::sleep(interval);
                }
                // Final flush so nothing dirty is stranded at shutdown.
                screen.lock().flush_to_renderer();
            })
            .ok();
        if handle.is_none() {
            log::error!("failed to spawn repaint pump thread");
        }
        RepaintPump { stop, handle }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RepaintPump {
    fn drop(&mut self) {
        self.stop();
    }
}
