pub mod motion;

pub use motion::MotionController;
