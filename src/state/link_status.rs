/// Link status definitions and the up/down transition rule
///
/// A link starts out `Unknown` and moves between `Up` and `Down` as checks
/// complete. Only a change of status counts as a transition; repeated results
/// leave `last_status_change` alone and never re-alert.
use std::fmt;

/// Recorded health of a monitored link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    /// No check has completed yet
    Unknown,

    /// The last check got a response in [200, 400)
    Up,

    /// The last check failed or got an error response
    Down,
}

/// Outcome of applying one check result to a link's previous status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LinkStatus,
    pub to: LinkStatus,
}

impl Transition {
    /// True when the status actually changed
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }

    /// True for the one transition that raises an alert: anything to `Down`
    ///
    /// Covers both `Up -> Down` and the first check of a new link that fails.
    pub fn went_down(&self) -> bool {
        self.is_change() && self.to == LinkStatus::Down
    }

    /// True when a down link came back up
    pub fn recovered(&self) -> bool {
        self.from == LinkStatus::Down && self.to == LinkStatus::Up
    }
}

impl LinkStatus {
    /// Maps a probe verdict onto a status
    pub fn from_is_up(is_up: bool) -> Self {
        if is_up {
            Self::Up
        } else {
            Self::Down
        }
    }

    /// Computes the transition caused by a check whose verdict is `is_up`
    pub fn transition(self, is_up: bool) -> Transition {
        Transition {
            from: self,
            to: Self::from_is_up(is_up),
        }
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(Self::Unknown),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_check_is_always_a_change() {
        assert!(LinkStatus::Unknown.transition(true).is_change());
        assert!(LinkStatus::Unknown.transition(false).is_change());
    }

    #[test]
    fn test_went_down() {
        assert!(LinkStatus::Up.transition(false).went_down());
        assert!(LinkStatus::Unknown.transition(false).went_down());

        // Repeated failures and recoveries never count as going down
        assert!(!LinkStatus::Down.transition(false).went_down());
        assert!(!LinkStatus::Down.transition(true).went_down());
        assert!(!LinkStatus::Up.transition(true).went_down());
    }

    #[test]
    fn test_recovered() {
        assert!(LinkStatus::Down.transition(true).recovered());
        assert!(!LinkStatus::Unknown.transition(true).recovered());
        assert!(!LinkStatus::Up.transition(true).recovered());
    }

    #[test]
    fn test_same_status_is_not_a_change() {
        let transition = LinkStatus::Down.transition(false);
        assert!(!transition.is_change());
        assert_eq!(transition.to, LinkStatus::Down);
    }

    #[test]
    fn test_db_string_unknown_value() {
        assert_eq!(LinkStatus::from_db_string("degraded"), None);
        assert_eq!(LinkStatus::from_db_string("down"), Some(LinkStatus::Down));
    }
}
