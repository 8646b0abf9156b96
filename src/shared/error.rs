/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Direction;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid request for floor {floor} going {direction}: {reason}")]
    InvalidRequest {
        floor: u8,
        direction: Direction,
        reason: String,
    },

    #[error("no pending {0} requests")]
    EmptyQueue(Direction),

    #[error("no lift available for {0} request")]
    NoAvailableLift(Direction),

    #[error("failed to load configuration: {0}")]
    Config(String),

    #[error("failed to load scenario: {0}")]
    Scenario(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
