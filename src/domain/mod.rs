/// Pure game rules: cell kinds, geometry, token motion, win/loss checks.
/// Nothing in here touches the terminal, the clock, or input devices.

pub mod cell;
pub mod geometry;
pub mod motion;
pub mod rules;
