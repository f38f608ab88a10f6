//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into layers:
//!
//! - **[`highlight`]**: the fixed token-type to style mapping and source highlighting
//! - **[`app`]**: viewer state and the keyboard event loop
//! - **[`panes`]**: stateless render functions for each visible pane
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: build it with [`App::load`] and
//! call [`App::run`] to start the event loop.
//!
//! [`App::load`]: app::App::load
//! [`App::run`]: app::App::run

pub mod app;
pub mod highlight;
pub mod panes;
pub mod theme;

pub use app::App;
pub use highlight::highlight_source;
