//! Editing: pointer gestures, editor commands, and the handle geometry they share with the
//! overlay.
//!
//! Every mutation goes through an [`EditScope`](scope::EditScope), which clamps the proposed
//! update against the element's print region before it reaches the document.

pub mod commands;
pub mod controller;
pub mod handles;
pub mod scope;
