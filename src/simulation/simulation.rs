/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::collections::HashMap;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::building::Building;
use crate::config::{BuildingConfig, Config};
use crate::dispatcher;
use crate::elevator::MotionController;
use crate::requests::RequestQueue;
use crate::scheduler::{TimerEvent, TimerQueue};
use crate::shared::{Direction, SimError, SimEvent, SimResult};
use crate::simulation::Stats;

/**
 * One simulation run: the building, its pending requests and the virtual clock.
 *
 * Everything is driven by timers on the virtual clock, so nothing happens
 * until the owner advances time with `advance_to` or
 * `run_until_idle`. Reconfiguring replaces the whole run.
 *
 * # Fields
 * - `building`:        Floors and per-lift state.
 * - `queue`:           Pending and active hall requests.
 * - `timers`:          Virtual clock and scheduled phase changes.
 * - `motion`:          Moves lifts through their trips.
 * - `event_tx`:        Outputs for the presentation layer.
 * - `requested_at`:    Request times of active requests, for statistics.
 * - `stats`:           Served requests and waiting times.
 */
pub struct Simulation {
    building: Building,
    queue: RequestQueue,
    timers: TimerQueue,
    motion: MotionController,
    event_tx: cbc::Sender<SimEvent>,
    requested_at: HashMap<(u8, Direction), u64>,
    stats: Stats,
}

/***************************************/
/*             Public API              */
/***************************************/
impl Simulation {
    pub fn new(config: &Config, event_tx: cbc::Sender<SimEvent>) -> SimResult<Simulation> {
        config.timing.validate()?;
        let building = Building::new(&config.building)?;
        info!(
            "Generated building with {} floors and {} lifts",
            building.n_floors(),
            building.n_lifts()
        );

        Ok(Simulation {
            building,
            queue: RequestQueue::new(),
            timers: TimerQueue::new(),
            motion: MotionController::new(config.timing, event_tx.clone()),
            event_tx,
            requested_at: HashMap::new(),
            stats: Stats::default(),
        })
    }

    /// Starts over with a new building. On error the current run is kept.
    pub fn reconfigure(&mut self, building: &BuildingConfig) -> SimResult<()> {
        let config = Config {
            building: *building,
            timing: *self.motion.timing(),
        };
        *self = Simulation::new(&config, self.event_tx.clone())?;
        Ok(())
    }

    /// Returns Ok(false) when the floor is already requested in that direction.
    pub fn request_lift(&mut self, floor: u8, direction: Direction) -> SimResult<bool> {
        self.validate_request(floor, direction)?;

        if !self.queue.request(floor, direction) {
            return Ok(false);
        }

        let now = self.timers.now();
        info!("t={} floor {} requested going {}", now, floor, direction);
        self.requested_at.insert((floor, direction), now);
        self.emit(SimEvent::RequestButtonStateChanged {
            at_ms: now,
            floor,
            direction,
            active: true,
        });
        self.dispatch(direction);
        Ok(true)
    }

    /// Fires every timer due up to and including `until`.
    pub fn advance_to(&mut self, until: u64) {
        while let Some(timer) = self.timers.pop_due(until) {
            self.handle_timer(timer.event);
        }
        self.timers.advance_clock(until);
    }

    #[cfg(test)]
    pub fn advance_by(&mut self, ms: u64) {
        self.advance_to(self.timers.now().saturating_add(ms));
    }

    /// Runs until no timers remain or `limit` is reached. Returns the clock.
    pub fn run_until_idle(&mut self, limit: u64) -> u64 {
        while let Some(due) = self.timers.next_due() {
            if due > limit {
                warn!("Stopped at t={} with {} timers pending", limit, self.timers.len());
                self.timers.advance_clock(limit);
                break;
            }
            self.advance_to(due);
        }
        self.timers.now()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
            && self.queue.is_empty()
            && self.building.lifts().iter().all(|lift| !lift.busy)
    }

    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn building(&self) -> &Building {
        &self.building
    }

    #[cfg(test)]
    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /***************************************/
    /*          Private functions          */
    /***************************************/
    // Which buttons exist on a floor is up to the caller, only the range is checked here
    fn validate_request(&self, floor: u8, direction: Direction) -> SimResult<()> {
        if floor < 1 || floor > self.building.top_floor() {
            return Err(SimError::InvalidRequest {
                floor,
                direction,
                reason: format!("floors are numbered 1 to {}", self.building.top_floor()),
            });
        }
        Ok(())
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Depart(id) => {
                if let Some(lift) = self.building.lift_mut(id) {
                    self.motion.depart(lift, &mut self.timers);
                }
            }

            TimerEvent::Arrive(id) => {
                if let Some(lift) = self.building.lift_mut(id) {
                    self.motion.arrive(lift, &mut self.timers);
                }
            }

            TimerEvent::DoorClose(id) => {
                let served = match self.building.lift_mut(id) {
                    Some(lift) => self.motion.close_doors(lift, &mut self.queue, &mut self.timers),
                    None => None,
                };
                if let Some(request) = served {
                    if let Some(at) = self.requested_at.remove(&(request.floor, request.direction)) {
                        self.stats.record(self.timers.now() - at);
                    }
                }
            }

            TimerEvent::Release(id) => {
                let direction = match self.building.lift_mut(id) {
                    Some(lift) => self.motion.release(lift),
                    None => None,
                };
                if let Some(direction) = direction {
                    self.dispatch(direction);

                    // Not picked again, so drop the commitment
                    if let Some(lift) = self.building.lift_mut(id) {
                        if !lift.busy {
                            lift.direction = None;
                        }
                    }
                }
            }

            TimerEvent::Retry(direction) | TimerEvent::Dispatch(direction) => {
                self.dispatch(direction);
            }
        }
    }

    fn dispatch(&mut self, direction: Direction) {
        match dispatcher::try_assign(&mut self.building, &mut self.queue, direction) {
            Ok(assignment) => {
                if let Some(lift) = self.building.lift_mut(assignment.lift) {
                    self.motion.begin_trip(lift, &mut self.timers);
                }
            }
            Err(SimError::EmptyQueue(_)) => {}
            Err(SimError::NoAvailableLift(direction)) => {
                debug!("Retrying {} requests later", direction);
                let delay = self.motion.timing().retry_delay;
                self.timers.schedule(delay, TimerEvent::Retry(direction));
            }
            Err(e) => warn!("Dispatch failed: {}", e),
        }
    }

    fn emit(&self, event: SimEvent) {
        let _ = self.event_tx.send(event);
    }
}
