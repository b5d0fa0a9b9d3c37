//! Pure reducer for view state transitions
//!
//! `reduce` has no side effects: no I/O, no logging, no clock. The session
//! decides when to dispatch and what to do with the result.

use super::actions::ShellAction;
use super::state::ViewState;

/// Apply `action` to `state`, returning the next state
///
/// The load completion applies at most once. A second completion (or one
/// that races an already settled state) leaves the state untouched, so a
/// resolved configuration is never replaced or cleared.
pub fn reduce(state: ViewState, action: ShellAction) -> ViewState {
    match action {
        ShellAction::ConfigLoaded(config) => {
            if !state.is_loading {
                return state;
            }
            ViewState {
                config: Some(config),
                is_loading: false,
                ..state
            }
        }

        ShellAction::ConfigFailed(error) => {
            if !state.is_loading {
                return state;
            }
            ViewState {
                error: Some(error),
                is_loading: false,
                ..state
            }
        }

        ShellAction::MaintenanceChanged(enabled) => ViewState {
            maintenance_mode: enabled,
            ..state
        },
    }
}
