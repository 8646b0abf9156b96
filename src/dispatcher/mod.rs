pub mod dispatcher;

pub use dispatcher::try_assign;
