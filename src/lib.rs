//! Drape composes garment mockups: text, images, and shapes placed into print regions across a
//! garment's views, warped to follow the fabric's folds, and previewed with an editing overlay that
//! stays aligned with the raster.
//!
//! The public API is session-oriented:
//!
//! - Describe the garment's views as [`ViewSpec`]s and open a [`MockupSession`]
//! - Feed it pointer events and editor commands; every edit is clamped to its print region
//! - Supply asset bytes through an [`AssetSource`] and pull frames with
//!   [`MockupSession::render_frame`], which also drives preview caching through a
//!   [`PersistenceSink`]
#![forbid(unsafe_code)]

/// Decoded images, byte sources, and ticketed loads.
pub mod assets;
/// Preview cache keys and dirty tracking.
pub mod cache;
/// Engine configuration.
pub mod config;
/// Fold displacement maps and filters.
pub mod displacement;
/// The design document and undo history.
pub mod document;
pub(crate) mod foundation;
/// Inch/pixel conversion and rotated-box math.
pub mod geometry;
/// Pointer gestures and editor commands.
pub mod interaction;
/// Views, print regions, elements, and constraint.
pub mod model;
/// Snapshot and design persistence.
pub mod persist;
/// CPU compositing and the edit overlay.
pub mod render;
/// The editing session.
pub mod session;
/// Font handling and text measurement.
pub mod text;

pub use crate::foundation::core::{
    Affine, BezPath, ElementId, PlaceholderId, Point, Rect, Rgb8, Rgba8Premul, Transform2D, Vec2,
    ViewId,
};
pub use crate::foundation::error::{DrapeError, DrapeResult};
pub use crate::foundation::notice::{Notice, NoticeKind};

pub use crate::assets::loader::{Clock, LoadTicket, ManualClock, SystemClock};
pub use crate::assets::source::{AssetSource, DirAssetSource, MemoryAssetSource};
pub use crate::cache::{CacheDecision, CacheKey, PreviewCacheManager};
pub use crate::config::EngineConfig;
pub use crate::displacement::DisplacementSettings;
pub use crate::document::{DesignDocument, PersistedDesign};
pub use crate::geometry::units::{CanvasLayout, PhysicalSize, ViewGeometry};
pub use crate::interaction::controller::{EditOutcome, GestureEnd, GestureKind, PointerTarget};
pub use crate::model::element::{
    CanvasElement, ElementKind, ImageProps, ShapeKind, ShapeProps, TextAlign, TextProps,
};
pub use crate::model::placeholder::{ClipShape, InchPoint, Placeholder};
pub use crate::model::update::ElementUpdate;
pub use crate::model::view::ViewSpec;
pub use crate::persist::{DirSink, MemorySink, PersistenceSink, SnapshotRef};
pub use crate::render::{FrameRGBA, OverlayHit, OverlayScene, RenderMode};
pub use crate::session::{FrameImage, FrameResult, MockupSession, SaveReport};
