/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::building::Building;
use crate::requests::RequestQueue;
use crate::shared::{Direction, LiftState, SimError, SimResult};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub lift: usize,
    pub floor: u8,
    pub direction: Direction,
}

/***************************************/
/*             Public API              */
/***************************************/
/// Nearest free lift that is uncommitted or already committed to `direction`.
/// Equal distances go to the lowest lift id.
pub fn select_lift(lifts: &[LiftState], floor: u8, direction: Direction) -> Option<usize> {
    lifts
        .iter()
        .filter(|lift| lift.is_candidate_for(direction))
        .min_by_key(|lift| (lift.distance_to(floor), lift.id))
        .map(|lift| lift.id)
}

/**
 * Pops the oldest pending floor for `direction` and hands it to a lift.
 *
 * Errors:
 * - `EmptyQueue`: nothing pending, the caller should do nothing.
 * - `NoAvailableLift`: the floor went back to the end of the queue and the
 *   caller is expected to retry later.
 *
 * On success the lift is marked busy and committed to `direction`; moving it
 * is left to the motion controller.
 */
pub fn try_assign(
    building: &mut Building,
    queue: &mut RequestQueue,
    direction: Direction,
) -> SimResult<Assignment> {
    let floor = queue.dequeue_next(direction)?;

    let id = match select_lift(building.lifts(), floor, direction) {
        Some(id) => id,
        None => {
            debug!("No lift free for floor {} going {}, requeueing", floor, direction);
            queue.requeue(floor, direction);
            return Err(SimError::NoAvailableLift(direction));
        }
    };

    // select_lift only returns ids taken from the building itself
    let lift = match building.lift_mut(id) {
        Some(lift) => lift,
        None => {
            queue.requeue(floor, direction);
            return Err(SimError::NoAvailableLift(direction));
        }
    };
    lift.busy = true;
    lift.direction = Some(direction);
    lift.target = Some(floor);

    info!(
        "Assigned lift {} at floor {} to floor {} going {}",
        id, lift.floor, floor, direction
    );

    Ok(Assignment {
        lift: id,
        floor,
        direction,
    })
}
