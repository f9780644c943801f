//! Core types and trait definitions for the Cohort accelerator platform.
//!
//! Domain model, the tenant resolver, the placement engine, and the
//! [`store::AcceleratorStore`] abstraction — no HTTP, no database. Every
//! other crate in the workspace depends on this one.

// Native `async fn` in traits; the advisory lint about `Send` bounds on the
// returned futures does not apply since the trait spells them out.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod kanban;
pub mod people;
pub mod placement;
pub mod program;
pub mod resolver;
pub mod rule;
pub mod startup;
pub mod store;
pub mod tenant;

pub use error::{Error, Result};
