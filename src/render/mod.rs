pub mod renderer;

pub use renderer::{ControlsHint, HudStatus, Renderer};
