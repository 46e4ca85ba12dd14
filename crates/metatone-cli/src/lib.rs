//! MetaTone CLI library.
//!
//! Config loading, logging setup, the lyricist, session persistence, the
//! stage pipeline and the `metatone` command implementations.

pub mod commands;
pub mod config;
pub mod logging;
pub mod lyricist;
pub mod pipeline;
pub mod session;

pub use config::{load_config, ConfigOverrides};
pub use lyricist::{CommandLyricist, Lyricist, LyricistError};
pub use pipeline::{Performance, Pipeline, Stage};
