//! The site shell
//!
//! - Actions: what can happen to the shell
//! - State: the [`ViewState`] record
//! - Reducer: pure `(ViewState, ShellAction) -> ViewState`
//! - View: which of the four branches a state renders
//! - Session: [`Shell`], which owns the state, runs the provider once and
//!   answers path requests

pub mod actions;
pub mod reducer;
pub mod session;
pub mod state;
pub mod view;

pub use actions::ShellAction;
pub use reducer::reduce;
pub use session::{Shell, ShellOptions, ShellResponse};
pub use state::ViewState;
pub use view::{select_view, ShellView, ViewKind};
