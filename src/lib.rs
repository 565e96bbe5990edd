//! Home Assistant media browser card.
//!
//! The card lists a media-source directory tree, plays files on a chosen
//! media player (or opens them in the browser), remembers what was played,
//! and batches rapid seek presses into one host call.

pub mod api;
pub mod card;
pub mod components;
pub mod db;
pub mod utils;
