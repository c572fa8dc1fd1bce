//! a live terminal graph of memory, cpu, and core topology.
//!
//! memory and cpu utilization are sampled by independent producer tasks, and plotted by a
//! single render loop as each record arrives. core count and maximum frequency are read once.

pub use self::{
    collector::Outcome,
    config::{Config, Metrics},
    error::Error,
    window::{Layout, Sources},
};

use {self::canvas::Canvas, std::io};

pub mod canvas;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod feed;
pub mod meminfo;
pub mod producer;
pub mod scale;
pub mod sentinel;
pub mod source;
pub mod topology;

/// kernel statistics facilities.
///
/// this file provides tools to interact with `/proc/stat`.
pub mod stat;

/// the dashboard's terminal interface.
mod window;

/// the dashboard.
pub struct App<W = io::Stdout> {
    config: Config,
    canvas: Canvas<W>,
}
