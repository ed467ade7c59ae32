//! Text shaping (parley) and glyph-box measurement used by the constraint layer.

pub mod layout;
pub mod measure;
