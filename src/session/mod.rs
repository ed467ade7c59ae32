//! The editing session: document, assets, scenes, gestures, history, and the preview cache behind
//! one handle.

pub mod mockup;

pub use mockup::{FrameImage, FrameResult, MockupSession, SaveReport};
