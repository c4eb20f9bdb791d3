//! Core types and trait definitions for the dockboard scheduling system:
//! reference entities, roster lifecycle types, dock-door records, calendar
//! math, and the `ScheduleStore` abstraction.
//!
//! This crate carries no HTTP or database dependency; every other crate in
//! the workspace builds on it.

// Backends implement the store trait with native `async fn` (Rust 1.75+).
// Silence the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod door;
pub mod entity;
pub mod error;
pub mod roster;
pub mod store;

pub use error::{Error, Result};
