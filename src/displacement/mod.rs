//! Fold-following displacement derived from the garment photo.
//!
//! A [`map::DisplacementMap`] is generated from the garment's luminance and aligned with the
//! garment sprite on the canvas. The [`filter::FilterRegistry`] owns the current map and hands out
//! a new [`filter::FilterToken`] on every rebuild so element layers can be re-pointed instead of
//! holding on to a stale filter.

pub mod filter;
pub mod map;
pub mod settings;

pub use filter::{DisplacementFilter, FilterRegistry, FilterToken};
pub use map::DisplacementMap;
pub use settings::DisplacementSettings;
