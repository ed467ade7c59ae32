//! Design data: views and print regions from the catalog, canvas elements, and edits to them.

pub mod blend;
pub mod constrain;
pub mod element;
pub mod placeholder;
pub mod update;
pub mod view;
