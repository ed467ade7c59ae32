//! View compositing on the CPU.
//!
//! A frame is built from a pooled canvas-sized surface: the garment sprite is drawn and tinted,
//! then every design upload and element is rasterized into its own layer, warped by the view's
//! displacement filter, masked by its region's [`ClipShape`](crate::model::placeholder::ClipShape),
//! and blended onto the canvas. Edit mode also returns an [`OverlayScene`] built from the same
//! clip outlines.

pub mod backend;
pub(crate) mod composite;
pub(crate) mod filters;
pub mod overlay;
pub mod pipeline;
pub(crate) mod raster;
pub mod scene;
pub(crate) mod shapes;
pub(crate) mod surface_pool;

pub use backend::FrameRGBA;
pub use overlay::{OverlayHit, OverlayScene};
pub use pipeline::{BlendDefaults, RenderMode, RenderOutput, ViewFrameInputs, ViewRenderer};
pub use scene::{LayerKey, ViewScene};
