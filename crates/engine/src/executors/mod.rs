//! Built-in action executors, one module per concern.

pub mod broadcast;
pub mod send_webhook;
pub mod set_variable;
pub mod timer_control;
