//! # Marigold UI
//!
//! Pointer event routing: clickable polygons indexed in a quad tree,
//! queried against per-frame input to decide which scene nodes get
//! pressed, clicked, and hovered.
//!
//! ## Core Types
//!
//! - [`Receiver`] — A clickable polygon registered for one node and button
//! - [`QuadTree`] — Midpoint-split spatial index over receivers
//! - [`ClickIndex`] — The registry components talk to, backed by the tree
//! - [`EventRouter`] — Turns an input snapshot into per-node pointer events

mod quad_tree;
mod receiver;
mod router;

pub use quad_tree::QuadTree;
pub use receiver::Receiver;
pub use router::{CLICK_MESSAGE, ClickIndex, EventRouter};
