/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::BuildingConfig;
use crate::shared::{LiftState, SimResult};

/***************************************/
/*             Public API              */
/***************************************/
/// Floors are numbered from 1, lifts from 0. Every lift starts idle at floor 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    n_floors: u8,
    lifts: Vec<LiftState>,
}

impl Building {
    pub fn new(config: &BuildingConfig) -> SimResult<Building> {
        config.validate()?;
        Ok(Building {
            n_floors: config.n_floors,
            lifts: (0..config.n_lifts as usize).map(LiftState::new).collect(),
        })
    }

    pub fn n_floors(&self) -> u8 {
        self.n_floors
    }

    pub fn n_lifts(&self) -> usize {
        self.lifts.len()
    }

    pub fn top_floor(&self) -> u8 {
        self.n_floors
    }

    pub fn lifts(&self) -> &[LiftState] {
        &self.lifts
    }

    #[cfg(test)]
    pub fn lift(&self, id: usize) -> Option<&LiftState> {
        self.lifts.get(id)
    }

    pub fn lift_mut(&mut self, id: usize) -> Option<&mut LiftState> {
        self.lifts.get_mut(id)
    }
}
