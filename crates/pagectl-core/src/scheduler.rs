//! Deterministic, host-driven timer scheduling.
//!
//! The page never owns ambient intervals. Every timer is an entry in a
//! [`Scheduler`] keyed by its deadline on a [`DeterministicClock`] that the
//! host advances explicitly. This keeps cancel-and-restart contracts (slider
//! auto-advance) observable in tests and guarantees nothing fires after
//! [`Scheduler::cancel_all`].
//!
//! Firing order is `(deadline, insertion sequence)`. Repeating entries are
//! re-armed on their original phase (`deadline + k * interval`), not from
//! the time the host got around to advancing the clock, so periods do not
//! drift. Periods missed during one long advance are coalesced: a repeating
//! entry fires at most once per drain, like a browser interval after the
//! tab was suspended.

use std::collections::{BTreeMap, HashMap};

use web_time::Duration;

/// Smallest period accepted for repeating timers.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward to `now`. Earlier instants are ignored.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Opaque handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    task: T,
    every: Option<Duration>,
}

/// A task that came due, together with the instant it was due at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub at: Duration,
    pub task: T,
}

/// Cancellable one-shot and repeating tasks over a deterministic clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    clock: DeterministicClock,
    queue: BTreeMap<(Duration, u64), Entry<T>>,
    keys: HashMap<TimerId, (Duration, u64)>,
    next_seq: u64,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the earliest task due at or before `until`.
    ///
    /// The clock is moved to the task's deadline before returning, so tasks
    /// scheduled while handling it are relative to its logical fire time.
    /// Repeating tasks are re-armed before being handed out; cancelling the
    /// returned id from the handler stops further repetitions.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let (&key, _) = self.queue.iter().next()?;
        if key.0 > until {
            return None;
        }
        let entry = self.queue.remove(&key)?;
        self.keys.remove(&entry.id);
        self.clock.set(key.0);
        tracing::trace!(
            target: "pagectl.timer",
            timer_id = entry.id.get(),
            at_ms = key.0.as_millis() as u64,
            "timer fired"
        );
        let Entry { id, task, every } = entry;
        let task = match every {
            Some(interval) => {
                let fired = task.clone();
                let (next, skipped) = next_period(key.0, interval, until);
                if skipped > 0 {
                    tracing::debug!(
                        target: "pagectl.timer",
                        timer_id = id.get(),
                        skipped,
                        "coalesced missed periods"
                    );
                }
                self.insert(
                    next,
                    Entry {
                        id,
                        task,
                        every: Some(interval),
                    },
                );
                fired
            }
            None => task,
        };
        Some(Fired { id, at: key.0, task })
    }
}

/// First `deadline + k * interval` (k >= 1) strictly after `until`, with the
/// number of periods skipped on the way.
fn next_period(deadline: Duration, interval: Duration, until: Duration) -> (Duration, u64) {
    let next = deadline.saturating_add(interval);
    if next > until {
        return (next, 0);
    }
    let step = interval.as_nanos().max(1);
    let behind = until.saturating_sub(deadline).as_nanos();
    let periods = behind / step + 1;
    let skipped = u64::try_from(periods - 1).unwrap_or(u64::MAX);
    let offset = step.saturating_mul(periods);
    let offset = Duration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX));
    (deadline.saturating_add(offset), skipped)
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: DeterministicClock::new(),
            queue: BTreeMap::new(),
            keys: HashMap::new(),
            next_seq: 0,
            next_id: 0,
        }
    }

    /// Current logical time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Move logical time forward without firing anything.
    ///
    /// Callers drain [`pop_due`](Self::pop_due) up to `now` first.
    pub fn set_now(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Run `task` once, `delay` from now.
    pub fn schedule_once(&mut self, delay: Duration, task: T) -> TimerId {
        let id = self.allocate_id();
        let at = self.now().saturating_add(delay);
        self.insert(
            at,
            Entry {
                id,
                task,
                every: None,
            },
        );
        id
    }

    /// Run `task` every `interval`, first one `interval` from now.
    pub fn schedule_every(&mut self, interval: Duration, task: T) -> TimerId {
        let interval = if interval < MIN_INTERVAL {
            tracing::warn!(
                target: "pagectl.timer",
                interval_us = interval.as_micros() as u64,
                "repeating interval too short; clamping to 1ms"
            );
            MIN_INTERVAL
        } else {
            interval
        };
        let id = self.allocate_id();
        let at = self.now().saturating_add(interval);
        self.insert(
            at,
            Entry {
                id,
                task,
                every: Some(interval),
            },
        );
        id
    }

    /// Cancel a pending task. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.keys.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every pending task.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        self.keys.clear();
        cancelled
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.keys.contains_key(&id)
    }

    /// Deadline of the earliest pending task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|&(at, _)| at)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, at: Duration, entry: Entry<T>) {
        let key = (at, self.next_seq);
        self.next_seq += 1;
        self.keys.insert(entry.id, key);
        self.queue.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(s: &mut Scheduler<&'static str>, until: Duration) -> Vec<(u64, &'static str)> {
        let mut out = Vec::new();
        while let Some(fired) = s.pop_due(until) {
            out.push((fired.at.as_millis() as u64, fired.task));
        }
        s.set_now(until);
        out
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut clock = DeterministicClock::new();
        clock.advance(ms(10));
        clock.set(ms(5));
        assert_eq!(clock.now(), ms(10));
    }

    #[test]
    fn once_fires_exactly_once() {
        let mut s = Scheduler::new();
        s.schedule_once(ms(100), "a");
        assert!(drain(&mut s, ms(99)).is_empty());
        assert_eq!(drain(&mut s, ms(100)), vec![(100, "a")]);
        assert!(drain(&mut s, ms(1000)).is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn every_rearms_from_previous_deadline() {
        let mut s = Scheduler::new();
        s.schedule_every(ms(50), "tick");
        assert_eq!(drain(&mut s, ms(60)), vec![(50, "tick")]);
        assert_eq!(drain(&mut s, ms(120)), vec![(100, "tick")]);
        assert_eq!(s.next_deadline(), Some(ms(150)));
    }

    #[test]
    fn missed_periods_fire_once_and_keep_phase() {
        let mut s = Scheduler::new();
        s.schedule_every(ms(50), "tick");
        assert_eq!(drain(&mut s, ms(175)), vec![(50, "tick")]);
        assert_eq!(s.next_deadline(), Some(ms(200)));

        s.schedule_once(ms(0), "marker");
        assert_eq!(drain(&mut s, ms(200)), vec![(175, "marker"), (200, "tick")]);
        assert_eq!(s.next_deadline(), Some(ms(250)));
    }

    #[test]
    fn day_long_gap_is_a_single_fire() {
        let mut s = Scheduler::new();
        s.schedule_every(ms(2000), "spawn");
        s.schedule_every(ms(5000), "advance");
        let day = Duration::from_secs(24 * 60 * 60);
        let fired = drain(&mut s, day);
        assert_eq!(fired, vec![(2000, "spawn"), (5000, "advance")]);
        let next = s.next_deadline().unwrap();
        assert!(next > day && next <= day + ms(2000));
    }

    #[test]
    fn next_period_lands_on_original_phase() {
        assert_eq!(next_period(ms(100), ms(30), ms(110)), (ms(130), 0));
        assert_eq!(next_period(ms(100), ms(30), ms(130)), (ms(160), 1));
        assert_eq!(next_period(ms(100), ms(30), ms(195)), (ms(220), 3));
    }

    #[test]
    fn equal_deadlines_fire_in_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule_once(ms(10), "first");
        s.schedule_once(ms(10), "second");
        s.schedule_once(ms(5), "earliest");
        assert_eq!(
            drain(&mut s, ms(10)),
            vec![(5, "earliest"), (10, "first"), (10, "second")]
        );
    }

    #[test]
    fn cancel_removes_pending_task() {
        let mut s = Scheduler::new();
        let id = s.schedule_every(ms(10), "tick");
        assert!(s.is_pending(id));
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(drain(&mut s, ms(100)).is_empty());
    }

    #[test]
    fn cancel_all_clears_everything() {
        let mut s = Scheduler::new();
        s.schedule_once(ms(1), "a");
        s.schedule_every(ms(2), "b");
        assert_eq!(s.cancel_all(), 2);
        assert_eq!(s.next_deadline(), None);
        assert!(drain(&mut s, ms(100)).is_empty());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut s = Scheduler::new();
        s.schedule_every(Duration::ZERO, "spin");
        assert_eq!(s.next_deadline(), Some(ms(1)));
    }

    #[test]
    fn tasks_scheduled_while_draining_use_fire_time() {
        let mut s = Scheduler::new();
        s.schedule_once(ms(100), "parent");
        let fired = s.pop_due(ms(1000)).unwrap();
        assert_eq!(fired.at, ms(100));
        s.schedule_once(ms(50), "child");
        assert_eq!(s.next_deadline(), Some(ms(150)));
    }
}
