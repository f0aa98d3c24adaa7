//! Platform abstraction layer
//!
//! Turns raw browser input (key codes, touch swipes, device tilt) into the
//! normalised `InputEvent`s the simulation consumes.

pub mod input;

pub use input::{Swipe, TiltSteering, key_to_input, swipe_to_input};
