//! Operator commands over an inspected Tilck kernel.
//!
//! [`session::Session`] ties a loaded [`tilck_config::InspectConfig`] to the
//! printer registry and runs `get-*` command lines against it; [`format`]
//! turns the resulting values into debugger-style text.

#![deny(warnings)]

#[macro_use]
extern crate log;

pub mod commands;
pub mod format;
pub mod logging;
pub mod session;
