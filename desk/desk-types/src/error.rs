//! Error types for desk operations.
//!
//! [`Rejection`] is the command-rejection taxonomy: every variant is a
//! synchronous, human-readable refusal that is surfaced to the command
//! channel and never retried. Placement exhaustion and capacity overflow are
//! *not* errors; they recover through the tabletop fallback.

use thiserror::Error;

/// Reasons a command is refused before anything moves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Rejection {
    /// The text matches neither command grammar.
    #[error("unrecognized command '{0}'; expected 'open|close <name>' or 'move|put <object> on|to|in|into <target>'")]
    Malformed(String),

    /// The source object name does not resolve.
    #[error("object '{0}' not found in the scene")]
    UnknownObject(String),

    /// The target name does not resolve.
    #[error("target '{0}' not found in the scene")]
    UnknownTarget(String),

    /// The target lidded box is closed.
    #[error("cannot place objects in {0} because the lid is closed; open {0} first")]
    LidClosed(String),

    /// The target drawer is closed.
    #[error("{0} is not open; open {0} first")]
    DrawerClosed(String),

    /// A drawer stacked above the target drawer is open.
    #[error("cannot access {drawer} because {upper} is open; close upper drawers first ({upper})")]
    UpperDrawerOpen {
        /// The drawer being accessed.
        drawer: String,
        /// The open drawer above it.
        upper: String,
    },

    /// Something rests on top of the object being moved.
    #[error("{object} is blocked by {blocker} on top of it")]
    SourceBlocked {
        /// The object being moved.
        object: String,
        /// What rests on it.
        blocker: String,
    },

    /// The object sits in a container that is closed.
    #[error("cannot move {object} from {container} because the container is closed; open {container} first")]
    SourceContainerClosed {
        /// The object being moved.
        object: String,
        /// Its closed container.
        container: String,
    },

    /// Something rests on top of the target container.
    #[error("{target} is blocked by objects on top: {blockers}; clear them first")]
    TargetBlocked {
        /// The target.
        target: String,
        /// Comma-separated names of what rests on it.
        blockers: String,
    },

    /// The target cannot hold or support anything.
    #[error("cannot place objects on {0}; it cannot support other objects")]
    UnsupportedTarget(String),

    /// The object kind is fixed in place.
    #[error("{0} cannot be moved")]
    NotMovable(String),

    /// Open/close issued against something without a lid or slide.
    #[error("{0} cannot be opened or closed")]
    NotToggleable(String),

    /// The target is the object itself or something nested inside it.
    #[error("cannot place {object} relative to {target}, which it contains or is")]
    SelfTarget {
        /// The object being moved.
        object: String,
        /// The offending target.
        target: String,
    },

    /// A container cannot be placed inside another container.
    #[error("cannot move container {object} into another container {target}; place it on the table or on top of an object instead")]
    NestedContainer {
        /// The container being moved.
        object: String,
        /// The target container.
        target: String,
    },

    /// The object is already mid-animation.
    #[error("{0} is already being moved")]
    AlreadyAnimating(String),
}

/// Errors that can occur in desk operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum DeskError {
    /// A command was refused.
    #[error("command rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Referenced object id is not tracked.
    #[error("unknown object id: {0}")]
    UnknownObject(String),

    /// Referenced body id is not in the body set.
    #[error("unknown body id: {0}")]
    UnknownBody(u64),

    /// An object with this id already exists.
    #[error("duplicate object id: {0}")]
    DuplicateObject(String),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl DeskError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a command rejection.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }

    /// The rejection, if this is one.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        let r = Rejection::LidClosed("lid_box".into());
        assert!(r.to_string().contains("lid is closed"));

        let r = Rejection::UpperDrawerOpen {
            drawer: "short_cabinet/drawer_low".into(),
            upper: "short_cabinet/drawer_high".into(),
        };
        assert!(r.to_string().contains("close upper drawers"));
        assert!(r.to_string().contains("drawer_high"));

        let r = Rejection::SourceBlocked {
            object: "red_box".into(),
            blocker: "blue_box".into(),
        };
        assert!(r.to_string().contains("blocked by blue_box"));

        let r = Rejection::NestedContainer {
            object: "red_box".into(),
            target: "lid_box_0".into(),
        };
        assert!(r.to_string().contains("into another container"));
    }

    #[test]
    fn test_error_predicates() {
        let err: DeskError = Rejection::UnknownObject("x".into()).into();
        assert!(err.is_rejection());
        assert!(!err.is_config_error());
        assert_eq!(err.rejection(), Some(&Rejection::UnknownObject("x".into())));

        let err = DeskError::invalid_config("bad value");
        assert!(err.is_config_error());
        assert!(err.rejection().is_none());
    }
}
