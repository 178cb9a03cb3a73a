//! State module for tracking link health
//!
//! - `LinkStatus`: the recorded status of a link (unknown, up, down)
//! - `Transition`: the effect of one check on that status

mod link_status;

pub use link_status::{LinkStatus, Transition};
