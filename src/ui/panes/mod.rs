//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: highlighted source with line numbers
//! - [`tokens`]: the program's token stream
//! - [`status`]: status bar with the run result and keybindings
//!
//! Each pane module exports a `render_*` function that takes the frame, its
//! area, the data to show and, for scrollable panes, the scroll offset.

pub mod source;
pub mod status;
pub mod tokens;

pub use source::render_source_pane;
pub use status::render_status_bar;
pub use tokens::render_tokens_pane;
