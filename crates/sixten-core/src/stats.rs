//! Weekly queue statistics.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults::STATS_WINDOW_DAYS;
use crate::models::{Link, LinkStatus};

/// Summary counters shown next to the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    /// Links created in the window, any status.
    pub added_this_week: usize,
    /// Links completed or deleted in the window.
    pub handled_this_week: usize,
    /// Links in inbox, active or later.
    pub queue_count: usize,
    /// Links currently in the active list.
    pub active_count: usize,
    /// Summed estimate of the active list.
    pub active_minutes: i32,
}

impl QueueStats {
    /// Compute stats over `links` (deleted rows included) as of `now`.
    pub fn compute(links: &[Link], now: DateTime<Utc>) -> Self {
        let since = now - Duration::days(STATS_WINDOW_DAYS);
        let mut stats = QueueStats::default();

        for link in links {
            if link.created_at >= since {
                stats.added_this_week += 1;
            }
            if matches!(link.status, LinkStatus::Done | LinkStatus::Deleted)
                && link.updated_at >= since
            {
                stats.handled_this_week += 1;
            }
            if link.status.is_queued() {
                stats.queue_count += 1;
            }
            if link.status == LinkStatus::Active {
                stats.active_count += 1;
                stats.active_minutes = stats.active_minutes.saturating_add(link.estimated_minutes);
            }
        }

        stats
    }
}
