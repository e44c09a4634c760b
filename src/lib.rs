//! Client-side controller for a chat bot's admin dashboard.
//!
//! - [`api`] talks to the bot's HTTP API.
//! - [`controller`] reconciles server snapshots into a view model and runs
//!   optimistic and pending-state mutations.
//! - [`scheduler`] drives polling and hosts the controller on a thread.
//! - [`render`] draws the view model in a terminal.
//! - [`notify`], [`config`] and [`logging`] are the supporting pieces.

pub mod api;
pub mod config;
pub mod controller;
pub mod logging;
pub mod notify;
pub mod render;
pub mod scheduler;
