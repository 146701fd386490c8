use alloc::vec::Vec;

/// Handle to a timer scheduled on a [`TimerQueue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<T> {
    id: TimerId,
    deadline_ms: u64,
    task: T,
}

/// One-shot, cancellable timers on the caller's clock.
///
/// The queue never reads a clock itself: callers pass `now_ms` when scheduling and when draining
/// due timers, so it can live on a single dispatch context next to the state it guards.
///
/// Due timers are returned in deadline order; timers sharing a deadline fire in the order they
/// were scheduled.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedules `task` to become due at `now_ms + delay_ms`.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            id,
            deadline_ms: now_ms.saturating_add(delay_ms),
            task,
        });
        id
    }

    /// Cancels a pending timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        self.entries.remove(pos);
        true
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.deadline_ms).min()
    }

    /// The id the next `schedule` call will hand out.
    ///
    /// Pass it to [`TimerQueue::pop_due_before`] to drain only timers that already existed,
    /// so callbacks that schedule follow-ups cannot starve the caller.
    pub fn watermark(&self) -> TimerId {
        TimerId(self.next_id)
    }

    /// Removes and returns the earliest timer due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, T)> {
        self.pop_matching(now_ms, |_| true)
    }

    /// Like [`TimerQueue::pop_due`], but ignores timers scheduled at or after `watermark`.
    pub fn pop_due_before(&mut self, now_ms: u64, watermark: TimerId) -> Option<(TimerId, T)> {
        self.pop_matching(now_ms, |id| id < watermark)
    }

    fn pop_matching(
        &mut self,
        now_ms: u64,
        keep: impl Fn(TimerId) -> bool,
    ) -> Option<(TimerId, T)> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline_ms <= now_ms && keep(e.id))
            .min_by_key(|(_, e)| (e.deadline_ms, e.id))
            .map(|(pos, _)| pos)?;
        let entry = self.entries.remove(pos);
        Some((entry.id, entry.task))
    }
}
