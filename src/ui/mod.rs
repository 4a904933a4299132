/// Terminal front end: input devices, the tilt mixer, rendering and audio.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
pub mod tilt;
