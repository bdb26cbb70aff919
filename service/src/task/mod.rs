//! Background [`Task`]s definitions.

mod background;
pub mod sweep_login_throttle;

pub use common::Handler as Task;

pub use self::{
    background::Background, sweep_login_throttle::SweepLoginThrottle,
};
