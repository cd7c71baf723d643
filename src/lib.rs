//! Terminal choropleth map of node counts.
//!
//! Counts and city coordinates are loaded concurrently, country boundaries
//! afterwards; the result is bucketed into colors and drawn with Braille
//! glyphs.

pub mod app;
pub mod braille;
pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod legend;
pub mod map;
pub mod palette;
pub mod scene;
pub mod ui;
