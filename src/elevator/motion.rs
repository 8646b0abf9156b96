/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::TimingConfig;
use crate::requests::RequestQueue;
use crate::scheduler::{TimerEvent, TimerQueue};
use crate::shared::{Behaviour, Direction, LiftState, Request, SimEvent};

/**
 * Drives a lift through one trip once the dispatcher has assigned it.
 *
 * `Idle -> Moving -> DoorOpen -> Idle`, or `DoorOpen -> DoorClosing -> Idle`
 * when more requests in the lift's direction are still active at door close.
 * Every phase ends with a timer; the owner feeds fired timers back into the
 * matching method.
 *
 * # Fields
 * - `timing`:      Dispatch latency, travel, door and retry timings.
 * - `event_tx`:    Position and door changes for the presentation layer.
 */
pub struct MotionController {
    timing: TimingConfig,
    event_tx: cbc::Sender<SimEvent>,
}

impl MotionController {
    pub fn new(timing: TimingConfig, event_tx: cbc::Sender<SimEvent>) -> MotionController {
        MotionController { timing, event_tx }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn travel_time(&self, from: u8, to: u8) -> u64 {
        from.abs_diff(to) as u64 * self.timing.travel_time_per_floor
    }

    /// Called right after the dispatcher marked the lift busy with a target.
    pub fn begin_trip(&self, lift: &mut LiftState, timers: &mut TimerQueue) {
        lift.behaviour = Behaviour::Moving;
        timers.schedule(self.timing.dispatch_latency, TimerEvent::Depart(lift.id));
    }

    pub fn depart(&self, lift: &mut LiftState, timers: &mut TimerQueue) {
        let target = match (lift.behaviour, lift.target) {
            (Behaviour::Moving, Some(target)) => target,
            _ => {
                warn!("Lift {} cannot depart from state {:?}", lift.id, lift.behaviour);
                return;
            }
        };

        let duration_ms = self.travel_time(lift.floor, target);
        debug!(
            "Lift {} leaving floor {} for floor {} ({} ms)",
            lift.id, lift.floor, target, duration_ms
        );
        self.emit(SimEvent::LiftPositionChanged {
            at_ms: timers.now(),
            lift: lift.id,
            floor: target,
            duration_ms,
        });
        timers.schedule(duration_ms, TimerEvent::Arrive(lift.id));
    }

    pub fn arrive(&self, lift: &mut LiftState, timers: &mut TimerQueue) {
        let target = match (lift.behaviour, lift.target) {
            (Behaviour::Moving, Some(target)) => target,
            _ => {
                warn!("Lift {} cannot arrive from state {:?}", lift.id, lift.behaviour);
                return;
            }
        };

        lift.floor = target;
        lift.behaviour = Behaviour::DoorOpen;
        info!("Lift {} arrived at floor {}", lift.id, target);
        self.emit(SimEvent::DoorStateChanged {
            at_ms: timers.now(),
            lift: lift.id,
            open: true,
        });
        timers.schedule(self.timing.door_open_time, TimerEvent::DoorClose(lift.id));
    }

    /// Closes the doors and clears the served request. Returns the request
    /// that was served.
    pub fn close_doors(
        &self,
        lift: &mut LiftState,
        queue: &mut RequestQueue,
        timers: &mut TimerQueue,
    ) -> Option<Request> {
        let (floor, direction) = match (lift.behaviour, lift.target, lift.direction) {
            (Behaviour::DoorOpen, Some(floor), Some(direction)) => (floor, direction),
            _ => {
                warn!("Lift {} has no open doors to close", lift.id);
                return None;
            }
        };

        self.emit(SimEvent::DoorStateChanged {
            at_ms: timers.now(),
            lift: lift.id,
            open: false,
        });
        lift.target = None;

        if queue.clear(floor, direction) {
            self.emit(SimEvent::RequestButtonStateChanged {
                at_ms: timers.now(),
                floor,
                direction,
                active: false,
            });
        }

        if queue.active_count(direction) > 0 {
            // Stay committed until the doors are fully shut
            lift.behaviour = Behaviour::DoorClosing;
            timers.schedule(self.timing.door_close_time, TimerEvent::Release(lift.id));
        } else {
            lift.behaviour = Behaviour::Idle;
            lift.busy = false;
            lift.direction = None;
            timers.schedule(self.timing.door_close_time, TimerEvent::Dispatch(direction));
        }

        info!("Lift {} served floor {} going {}", lift.id, floor, direction);
        Some(Request { floor, direction })
    }

    /// Frees a committed lift. The direction commitment is kept so the
    /// dispatcher can hand it the next request in that direction.
    pub fn release(&self, lift: &mut LiftState) -> Option<Direction> {
        if lift.behaviour != Behaviour::DoorClosing {
            warn!("Lift {} released from state {:?}", lift.id, lift.behaviour);
            return None;
        }
        lift.behaviour = Behaviour::Idle;
        lift.busy = false;
        lift.direction
    }

    fn emit(&self, event: SimEvent) {
        // Nobody listening is fine
        let _ = self.event_tx.send(event);
    }
}
