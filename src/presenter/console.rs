/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::SimEvent;

/// Prints simulation events to stdout until every sender is gone.
pub struct ConsolePresenter {
    event_rx: cbc::Receiver<SimEvent>,
    json: bool,
}

impl ConsolePresenter {
    pub fn new(event_rx: cbc::Receiver<SimEvent>, json: bool) -> ConsolePresenter {
        ConsolePresenter { event_rx, json }
    }

    pub fn run(self) {
        for event in self.event_rx.iter() {
            if self.json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Failed to serialize event: {}", e),
                }
            } else {
                println!("{}", describe_event(&event));
            }
        }
    }
}

pub fn describe_event(event: &SimEvent) -> String {
    match *event {
        SimEvent::LiftPositionChanged {
            at_ms,
            lift,
            floor,
            duration_ms,
        } => format!(
            "[{:>8} ms] lift {} heading to floor {} ({} ms)",
            at_ms, lift, floor, duration_ms
        ),
        SimEvent::DoorStateChanged { at_ms, lift, open } => format!(
            "[{:>8} ms] lift {} doors {}",
            at_ms,
            lift,
            if open { "open" } else { "closed" }
        ),
        SimEvent::RequestButtonStateChanged {
            at_ms,
            floor,
            direction,
            active,
        } => format!(
            "[{:>8} ms] floor {} {} button {}",
            at_ms,
            floor,
            direction,
            if active { "lit" } else { "off" }
        ),
    }
}
