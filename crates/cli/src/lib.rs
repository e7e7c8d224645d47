//! Terminal front end for fitlog: configuration and the interactive consent surface.

pub mod config;
pub mod terminal;

pub use config::Config;
pub use terminal::TerminalSurface;
