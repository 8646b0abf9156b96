/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Direction;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Dispatch latency elapsed, the lift starts travelling.
    Depart(usize),
    /// The lift reached its target floor.
    Arrive(usize),
    /// Door dwell elapsed.
    DoorClose(usize),
    /// A committed lift may take a new assignment.
    Release(usize),
    /// Backoff after no lift was available.
    Retry(Direction),
    /// Look for more work after a lift went idle.
    Dispatch(Direction),
}

#[derive(Debug, Clone, Copy)]
pub struct Timer {
    pub due: u64,
    pub event: TimerEvent,
    seq: u64,
}

// Reversed so the BinaryHeap pops the earliest timer first
impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Timer {}

/**
 * Virtual clock with a queue of pending timers.
 *
 * Time is in milliseconds since the simulation started. Timers due at the
 * same instant fire in the order they were scheduled.
 */
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: u64,
    next_seq: u64,
    timers: BinaryHeap<Timer>,
}

/***************************************/
/*             Public API              */
/***************************************/
impl TimerQueue {
    pub fn new() -> TimerQueue {
        TimerQueue::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay: u64, event: TimerEvent) {
        let due = self.now.saturating_add(delay);
        debug!("t={} scheduling {:?} at t={}", self.now, event, due);
        self.timers.push(Timer {
            due,
            event,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timers.peek().map(|timer| timer.due)
    }

    /// Pops the earliest timer due at or before `until` and moves the clock to it.
    pub fn pop_due(&mut self, until: u64) -> Option<Timer> {
        match self.timers.peek() {
            Some(timer) if timer.due <= until => {
                let timer = self.timers.pop()?;
                self.now = self.now.max(timer.due);
                Some(timer)
            }
            _ => None,
        }
    }

    /// Moves the clock forward; never backwards.
    pub fn advance_clock(&mut self, to: u64) {
        self.now = self.now.max(to);
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
