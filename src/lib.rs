//! Story Mapper: a node-graph editor for branching stories.
//!
//! Passages are free-text nodes positioned by hand on an infinite
//! canvas; edges are never stored, they are derived on every render
//! from `[[Title]]` references inside node bodies.

pub mod actions;
pub mod app;
pub mod effects;
pub mod links;
pub mod native;
pub mod persistence;
pub mod scene;
pub mod settings;
pub mod store;
pub mod story;
pub mod viewport;
pub mod web;

pub use app::create_app;
