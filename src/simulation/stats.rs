/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Serialize;

/// Service statistics. Wait is measured from the request to door close.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub served: u64,
    pub total_wait_ms: u64,
    pub max_wait_ms: u64,
}

impl Stats {
    pub fn record(&mut self, wait_ms: u64) {
        self.served += 1;
        self.total_wait_ms += wait_ms;
        self.max_wait_ms = self.max_wait_ms.max(wait_ms);
    }

    pub fn average_wait_ms(&self) -> Option<u64> {
        if self.served == 0 {
            None
        } else {
            Some(self.total_wait_ms / self.served)
        }
    }
}
