//! Repeating tick task with a mutable period
//!
//! `RepeatingTask` wraps a platform timer and guarantees at most one
//! outstanding schedule: every restart cancels the previous one first.

/// A platform timer able to fire a fixed callback at a fixed period
pub trait TimerBackend {
    type Handle;

    /// Start firing every `period_ms`. Returns None if the platform refused.
    fn schedule_repeating(&mut self, period_ms: u32) -> Option<Self::Handle>;

    /// Stop a schedule previously returned by `schedule_repeating`
    fn cancel(&mut self, handle: Self::Handle);
}

/// The single live tick schedule
pub struct RepeatingTask<B: TimerBackend> {
    backend: B,
    active: Option<(B::Handle, u32)>,
}

impl<B: TimerBackend> RepeatingTask<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    /// Cancel any running schedule and start a new one at `period_ms`
    pub fn restart(&mut self, period_ms: u32) {
        self.cancel();
        match self.backend.schedule_repeating(period_ms) {
            Some(handle) => self.active = Some((handle, period_ms)),
            None => log::warn!("Timer backend refused a {}ms schedule", period_ms),
        }
    }

    /// Cancel the running schedule, if any
    pub fn cancel(&mut self) {
        if let Some((handle, _)) = self.active.take() {
            self.backend.cancel(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Period of the running schedule
    pub fn period_ms(&self) -> Option<u32> {
        self.active.as_ref().map(|(_, period)| *period)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: TimerBackend> Drop for RepeatingTask<B> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    handle: u32,
    period_ms: u32,
    next_due_ms: u64,
}

/// Virtual-clock timer for headless runs and tests.
///
/// Time only moves through `fire_next_before`.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now_ms: u64,
    next_handle: u32,
    scheduled: Vec<Scheduled>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of live schedules
    pub fn outstanding(&self) -> usize {
        self.scheduled.len()
    }

    /// Fire the earliest schedule due at or before `deadline_ms`, advancing
    /// the clock to its due time. Returns its handle, or None (with the clock
    /// moved to the deadline) if nothing is due.
    pub fn fire_next_before(&mut self, deadline_ms: u64) -> Option<u32> {
        let next = self
            .scheduled
            .iter_mut()
            .filter(|s| s.next_due_ms <= deadline_ms)
            .min_by_key(|s| (s.next_due_ms, s.handle));

        match next {
            Some(s) => {
                self.now_ms = s.next_due_ms;
                s.next_due_ms += s.period_ms as u64;
                Some(s.handle)
            }
            None => {
                self.now_ms = self.now_ms.max(deadline_ms);
                None
            }
        }
    }
}

impl TimerBackend for ManualTimer {
    type Handle = u32;

    fn schedule_repeating(&mut self, period_ms: u32) -> Option<u32> {
        if period_ms == 0 {
            return None;
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.scheduled.push(Scheduled {
            handle,
            period_ms,
            next_due_ms: self.now_ms + period_ms as u64,
        });
        Some(handle)
    }

    fn cancel(&mut self, handle: u32) {
        self.scheduled.retain(|s| s.handle != handle);
    }
}
