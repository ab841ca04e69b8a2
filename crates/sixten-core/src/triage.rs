//! Triage rules: the status transition table and the active-list
//! capacity check.

use crate::defaults::{MAX_ACTIVE_LINKS, MAX_ACTIVE_MINUTES};
use crate::error::CapacityError;
use crate::models::{Link, LinkStatus};

/// Statuses reachable from `from` in one step.
pub fn allowed_targets(from: LinkStatus) -> &'static [LinkStatus] {
    use LinkStatus::*;
    match from {
        Inbox => &[Active, Later, Deleted],
        Active => &[Done, Later],
        Later => &[Active, Done, Deleted],
        Done => &[Deleted],
        Deleted => &[],
    }
}

pub fn can_transition(from: LinkStatus, to: LinkStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Limits on the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageLimits {
    pub max_active_links: usize,
    pub max_active_minutes: i32,
}

impl Default for TriageLimits {
    fn default() -> Self {
        Self {
            max_active_links: MAX_ACTIVE_LINKS,
            max_active_minutes: MAX_ACTIVE_MINUTES,
        }
    }
}

impl TriageLimits {
    /// Check whether a link with `candidate_minutes` fits next to the
    /// current active set.
    ///
    /// The count limit is checked first. The minutes limit is inclusive:
    /// a set that lands exactly on `max_active_minutes` is accepted.
    pub fn check(
        &self,
        active_count: usize,
        active_minutes: i32,
        candidate_minutes: i32,
    ) -> Result<(), CapacityError> {
        if active_count >= self.max_active_links {
            return Err(CapacityError::TooManyLinks {
                max: self.max_active_links,
            });
        }
        let total = active_minutes.saturating_add(candidate_minutes);
        if total > self.max_active_minutes {
            return Err(CapacityError::TooManyMinutes {
                candidate_minutes,
                remaining_minutes: (self.max_active_minutes - active_minutes).max(0),
                max_minutes: self.max_active_minutes,
            });
        }
        Ok(())
    }

    /// Same as [`check`](Self::check), summing over the given active links.
    pub fn check_links(&self, active: &[Link], candidate_minutes: i32) -> Result<(), CapacityError> {
        let minutes = active
            .iter()
            .fold(0i32, |acc, l| acc.saturating_add(l.estimated_minutes));
        self.check(active.len(), minutes, candidate_minutes)
    }

    /// Minutes still available on the active list.
    pub fn remaining_minutes(&self, active_minutes: i32) -> i32 {
        (self.max_active_minutes - active_minutes).max(0)
    }
}
