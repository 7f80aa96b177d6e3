//! Domain actions and their dispatch onto transitions.

use super::error::PackageError;
use super::{Package, PackageState};
use crate::core::State;
use crate::machine::TransitionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A domain-level verb mapped onto a single transition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageAction {
    Process,
    Ship,
    Deliver,
    Return,
    Cancel,
}

impl PackageAction {
    pub const ALL: [PackageAction; 5] = [
        Self::Process,
        Self::Ship,
        Self::Deliver,
        Self::Return,
        Self::Cancel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Ship => "ship",
            Self::Deliver => "deliver",
            Self::Return => "return",
            Self::Cancel => "cancel",
        }
    }

    /// The state this action leads to, whatever state it starts from.
    pub fn target(&self) -> PackageState {
        match self {
            Self::Process => PackageState::Processing,
            Self::Ship => PackageState::Shipped,
            Self::Deliver => PackageState::Delivered,
            Self::Return => PackageState::Returned,
            Self::Cancel => PackageState::Canceled,
        }
    }

    /// Details recorded when the action does not supply its own.
    pub fn default_details(&self) -> &'static str {
        match self {
            Self::Process => "Order processing started",
            Self::Ship => "Package shipped",
            Self::Deliver => "Package delivered",
            Self::Return => "Package returned",
            Self::Cancel => "Order canceled",
        }
    }
}

impl fmt::Display for PackageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackageAction {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| PackageError::UnknownAction(s.to_string()))
    }
}

impl Package {
    /// Perform `action` with its default details.
    pub fn perform(&mut self, action: PackageAction) -> Result<(), PackageError> {
        self.perform_with_details(action, action.default_details())
    }

    /// Perform `action`, recording `details` on the resulting transition.
    ///
    /// A canceled package rejects everything: cancel with
    /// [`PackageError::AlreadyInState`], anything else with
    /// [`PackageError::OrderCanceled`]. Otherwise the current state must
    /// permit the action before the transition is attempted.
    pub fn perform_with_details(
        &mut self,
        action: PackageAction,
        details: impl Into<String>,
    ) -> Result<(), PackageError> {
        let current = *self.current_state();
        if current == PackageState::Canceled {
            return Err(match action {
                PackageAction::Cancel => PackageError::AlreadyInState {
                    state: current.name().to_string(),
                },
                _ => PackageError::OrderCanceled {
                    id: self.id().to_string(),
                },
            });
        }

        let target = action.target();
        if !current.permits(action) {
            return Err(TransitionError::InvalidTransition {
                from: current.name().to_string(),
                to: target.name().to_string(),
            }
            .into());
        }

        self.transition_to_with_details(target, details)?;
        Ok(())
    }

    pub fn process(&mut self) -> Result<(), PackageError> {
        self.perform(PackageAction::Process)
    }

    pub fn ship(&mut self) -> Result<(), PackageError> {
        self.perform(PackageAction::Ship)
    }

    pub fn deliver(&mut self) -> Result<(), PackageError> {
        self.perform(PackageAction::Deliver)
    }

    pub fn return_package(&mut self) -> Result<(), PackageError> {
        self.perform(PackageAction::Return)
    }

    pub fn cancel(&mut self) -> Result<(), PackageError> {
        self.perform(PackageAction::Cancel)
    }

    /// Cancel, storing `reason` as the package's `canceled_reason`.
    pub fn cancel_with_reason(&mut self, reason: &str) -> Result<(), PackageError> {
        self.perform_with_details(PackageAction::Cancel, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordered() -> Package {
        let mut package = Package::create("PKG-1", "Books");
        package.initialize().unwrap();
        package
    }

    #[test]
    fn actions_parse_from_names() {
        for action in PackageAction::ALL {
            assert_eq!(action.name().parse::<PackageAction>(), Ok(action));
        }
        assert_eq!(
            "refund".parse::<PackageAction>(),
            Err(PackageError::UnknownAction("refund".to_string()))
        );
    }

    #[test]
    fn happy_path_reaches_delivered() {
        let mut package = ordered();
        package.process().unwrap();
        package.ship().unwrap();
        package.deliver().unwrap();

        assert_eq!(package.current_state(), &PackageState::Delivered);
        let path: Vec<_> = package.history().get_path().into_iter().copied().collect();
        assert_eq!(
            path,
            vec![
                PackageState::Ordered,
                PackageState::Processing,
                PackageState::Shipped,
                PackageState::Delivered
            ]
        );
        assert_eq!(
            package.history().last().unwrap().details,
            "Package delivered"
        );
    }

    #[test]
    fn returned_package_can_be_processed_again() {
        let mut package = ordered();
        package.process().unwrap();
        package.ship().unwrap();
        package.return_package().unwrap();
        package.process().unwrap();

        assert_eq!(package.current_state(), &PackageState::Processing);
        assert!(package.metadata().contains_key("returned_time"));
    }

    #[test]
    fn action_not_permitted_is_invalid_transition() {
        let mut package = ordered();
        let err = package.ship().unwrap_err();

        assert_eq!(
            err,
            PackageError::Transition(TransitionError::InvalidTransition {
                from: "Ordered".to_string(),
                to: "Shipped".to_string(),
            })
        );
        assert!(err.is_invalid_transition());
        assert_eq!(package.history().len(), 1);
    }

    #[test]
    fn canceled_package_rejects_everything() {
        let mut package = ordered();
        package.cancel().unwrap();

        for action in [
            PackageAction::Process,
            PackageAction::Ship,
            PackageAction::Deliver,
            PackageAction::Return,
        ] {
            assert_eq!(
                package.perform(action),
                Err(PackageError::OrderCanceled {
                    id: "PKG-1".to_string()
                })
            );
        }
        assert_eq!(
            package.cancel(),
            Err(PackageError::AlreadyInState {
                state: "Canceled".to_string()
            })
        );
        assert_eq!(package.history().len(), 2);
    }

    #[test]
    fn cancel_reason_is_recorded() {
        let mut package = ordered();
        package.process().unwrap();
        package.cancel_with_reason("Customer changed their mind").unwrap();

        assert_eq!(
            package.metadata().get_str("canceled_reason"),
            Some("Customer changed their mind")
        );
        assert!(package.metadata().contains_key("canceled_time"));
    }

    #[test]
    fn actions_require_initialization() {
        let mut package = Package::create("PKG-2", "Lamp");
        assert_eq!(
            package.process(),
            Err(PackageError::Transition(TransitionError::NotInitialized {
                id: "PKG-2".to_string()
            }))
        );
    }
}
