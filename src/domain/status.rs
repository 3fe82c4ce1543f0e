//! Shared shape of the status state machines.
//!
//! Each status enum owns a single transition table. Page menus render the
//! table and the mutating services refuse any target that is not in it.

use serde::Serialize;

/// One allowed move out of a status, with the label shown in menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTransition<S: 'static> {
    pub to: S,
    pub label: &'static str,
}

/// Returned when a status string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status `{0}`")]
pub struct UnknownStatus(pub String);

/// Status enums with a fixed transition table.
pub trait StatusMachine: Copy + Eq + Sized + 'static {
    /// Transitions allowed from `self`, in menu order.
    fn transitions(self) -> &'static [StatusTransition<Self>];

    /// Canonical upper-case name stored in the database.
    fn as_str(self) -> &'static str;

    fn can_transition_to(self, next: Self) -> bool {
        self.transitions().iter().any(|transition| transition.to == next)
    }

    fn is_terminal(self) -> bool {
        self.transitions().is_empty()
    }
}
