/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "moving")]
    Moving,
    #[serde(rename = "doorOpen")]
    DoorOpen,
    #[serde(rename = "doorClosing")]
    DoorClosing,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn index(&self) -> usize {
        match *self {
            Direction::Up => 0,
            Direction::Down => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub floor: u8,
    pub direction: Direction,
}

impl FromStr for Request {
    type Err = String;

    /// Parses `floor:dir` or `floor dir`, e.g. `5:up`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(|c: char| c == ':' || c.is_whitespace()).filter(|p| !p.is_empty());
        let floor = parts
            .next()
            .ok_or_else(|| "missing floor".to_string())?
            .parse::<u8>()
            .map_err(|e| format!("invalid floor: {}", e))?;
        let direction = parts
            .next()
            .ok_or_else(|| "missing direction".to_string())?
            .parse::<Direction>()?;
        if parts.next().is_some() {
            return Err(format!("trailing input in request '{}'", s));
        }
        Ok(Request { floor, direction })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LiftState {
    pub id: usize,
    pub behaviour: Behaviour,
    pub floor: u8,
    pub busy: bool,
    pub direction: Option<Direction>,
    pub target: Option<u8>,
}

impl LiftState {
    pub fn new(id: usize) -> LiftState {
        LiftState {
            id,
            behaviour: Behaviour::Idle,
            floor: 1,
            busy: false,
            direction: None,
            target: None,
        }
    }

    /// Free and either uncommitted or committed to `direction`.
    pub fn is_candidate_for(&self, direction: Direction) -> bool {
        !self.busy && self.direction.map_or(true, |d| d == direction)
    }

    pub fn distance_to(&self, floor: u8) -> u8 {
        self.floor.abs_diff(floor)
    }
}

/// Outputs of the core, consumed by whatever presents the building.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SimEvent {
    #[serde(rename_all = "camelCase")]
    LiftPositionChanged {
        at_ms: u64,
        lift: usize,
        floor: u8,
        duration_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    DoorStateChanged { at_ms: u64, lift: usize, open: bool },
    #[serde(rename_all = "camelCase")]
    RequestButtonStateChanged {
        at_ms: u64,
        floor: u8,
        direction: Direction,
        active: bool,
    },
}
