//! Movement-gated location tracking with a heatmap overlay.
//!
//! A [`tracking::Tracker`] runs one sampling loop at a time: every tick it
//! asks a [`device::LocationSource`] for a fix, holds logging back until the
//! device has moved away from its starting point, stores tracked points in
//! SQLite and redraws them through a [`render::HeatmapRenderer`].

pub mod config;
pub mod db;
pub mod device;
pub mod error;
pub mod models;
pub mod render;
pub mod tracking;
