use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::models::Notice;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(2);

/// Holds at most one visible notice and the timer that will dismiss it.
///
/// Showing a new notice aborts the pending timer of the previous one. The
/// timer only runs inside a tokio runtime; elsewhere a notice stays until it
/// is replaced or dismissed.
///
/// The board only tracks visibility and never draws anything. A front-end that
/// prints the notice once, like the terminal session, sees expiry only the
/// next time it asks for `current()`.
#[derive(Clone)]
pub struct NoticeBoard {
    inner: Arc<Mutex<NoticeSlot>>,
    ttl: Duration,
}

#[derive(Default)]
struct NoticeSlot {
    current: Option<Notice>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

impl NoticeSlot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for NoticeSlot {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(NoticeSlot::default())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn show(&self, notice: Notice) {
        let mut guard = self.inner.lock().expect("notice board poisoned");
        guard.cancel_timer();
        guard.generation += 1;
        let generation = guard.generation;
        guard.current = Some(notice);
        guard.timer = self.spawn_dismiss(generation);
    }

    pub fn current(&self) -> Option<Notice> {
        let guard = self.inner.lock().expect("notice board poisoned");
        guard.current.clone()
    }

    pub fn dismiss(&self) {
        let mut guard = self.inner.lock().expect("notice board poisoned");
        guard.cancel_timer();
        guard.generation += 1;
        guard.current = None;
    }

    fn spawn_dismiss(&self, generation: u64) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("notice: no async runtime, notice stays until replaced");
                return None;
            }
        };
        let slot: Weak<Mutex<NoticeSlot>> = Arc::downgrade(&self.inner);
        let ttl = self.ttl;
        Some(runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let mut guard = slot.lock().expect("notice board poisoned");
            // A newer notice may have been shown while this timer was waking up.
            if guard.generation == generation {
                guard.current = None;
                guard.timer = None;
            }
        }))
    }
}
