//! Playlist Palette
//!
//! Dominant-color palettes from the album covers of a playlist.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
