//! Core types, engine and trait definitions for the Plantafel planning board.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! read pipeline lives in [`board`], the write path in [`writer`]; both talk
//! to storage only through the traits in [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod absence;
pub mod aggregate;
pub mod assignment;
pub mod board;
pub mod conflict;
pub mod date;
pub mod directory;
pub mod error;
pub mod event;
pub mod normalize;
pub mod resource;
pub mod scope;
pub mod store;
pub mod timesheet;
pub mod writer;

#[cfg(test)]
mod memory;

pub use error::{Error, Result};
