//! UI module for the Dual Dread TUI

pub mod render;
pub mod theme;
