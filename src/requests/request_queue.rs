/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::debug;
use std::collections::{HashSet, VecDeque};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Direction, SimError, SimResult};

/***************************************/
/*       Public data structures        */
/***************************************/
/**
 * Pending hall requests, one FIFO per direction.
 *
 * A floor stays in the direction's active set from the moment it is requested
 * until the serving lift closes its doors, so it covers queued, in-flight and
 * door-open requests alike. `pending` only holds floors not yet assigned.
 */
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    queues: [DirectionQueue; 2],
}

#[derive(Debug, Clone, Default)]
struct DirectionQueue {
    active: HashSet<u8>,
    pending: VecDeque<u8>,
}

/***************************************/
/*             Public API              */
/***************************************/
impl RequestQueue {
    pub fn new() -> RequestQueue {
        RequestQueue::default()
    }

    /// Returns false if the floor was already requested in this direction.
    pub fn request(&mut self, floor: u8, direction: Direction) -> bool {
        let queue = &mut self.queues[direction.index()];
        if !queue.active.insert(floor) {
            debug!("Floor {} already requested going {}", floor, direction);
            return false;
        }
        queue.pending.push_back(floor);
        true
    }

    pub fn dequeue_next(&mut self, direction: Direction) -> SimResult<u8> {
        self.queues[direction.index()]
            .pending
            .pop_front()
            .ok_or(SimError::EmptyQueue(direction))
    }

    /// Puts an unassignable floor back at the end of the line.
    pub fn requeue(&mut self, floor: u8, direction: Direction) {
        self.queues[direction.index()].pending.push_back(floor);
    }

    /// Returns true if the floor was still active.
    pub fn clear(&mut self, floor: u8, direction: Direction) -> bool {
        self.queues[direction.index()].active.remove(&floor)
    }

    #[cfg(test)]
    pub fn is_active(&self, floor: u8, direction: Direction) -> bool {
        self.queues[direction.index()].active.contains(&floor)
    }

    pub fn active_count(&self, direction: Direction) -> usize {
        self.queues[direction.index()].active.len()
    }

    #[cfg(test)]
    pub fn pending(&self, direction: Direction) -> impl Iterator<Item = u8> + '_ {
        self.queues[direction.index()].pending.iter().copied()
    }

    #[cfg(test)]
    pub fn pending_count(&self, direction: Direction) -> usize {
        self.queues[direction.index()].pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(|q| q.active.is_empty())
    }
}
