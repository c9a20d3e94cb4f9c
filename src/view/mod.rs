//! View layer
//!
//! Everything that turns a [`surface::RenderPass`] into something visible.

pub mod chart;
pub mod headless;
pub mod layout;
pub mod surface;
pub mod terminal;
