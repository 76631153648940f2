//! Chat-driven personal file manager: directories, files and labels
//! browsed through inline keyboards, with link and per-user sharing.

pub mod bot;
pub mod engine;
pub mod model;
pub mod store;
pub mod transport;
