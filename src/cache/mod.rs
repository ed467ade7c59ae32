//! Preview cache keys, signatures, and the colour/design dirty tracking that decides when a view
//! is captured and persisted.

pub mod manager;
pub mod signature;

pub use manager::{CacheDecision, CacheKey, PreviewCacheManager};
pub use signature::{Signature, design_signature, settings_signature};
