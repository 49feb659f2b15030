//! Plot-ready transforms of parsed pattern data.

pub mod grid;
pub mod pattern;

pub use grid::GainGrid;
pub use pattern::{CutAngles, CutKind, DecibelStyle, PatternSet, PolarCut, Surface};
