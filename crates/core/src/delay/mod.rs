//! Regulatory delay simulation for the foreign feed.

mod delay_policy;

pub use delay_policy::{DelayPolicy, DelayState};
