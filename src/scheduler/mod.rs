pub mod timer_queue;

pub use timer_queue::TimerEvent;
pub use timer_queue::TimerQueue;
