use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Consider the cache stale after 1 hour.
/// Only informational: the sync policy never refetches on age alone.
const CACHE_STALE_MINUTES: i64 = 60;

/// Envelope written around persisted data, stamped with the write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        age_minutes(self.cached_at)
    }

    pub fn age_display(&self) -> String {
        age_display(self.cached_at)
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

fn age_minutes(at: DateTime<Utc>) -> i64 {
    (Utc::now() - at).num_minutes()
}

/// Human-readable age such as "just now", "5m ago", "2h ago", "3d ago".
fn age_display(at: DateTime<Utc>) -> String {
    let minutes = age_minutes(at);
    if minutes < 1 {
        // Clock skew lands here too
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
