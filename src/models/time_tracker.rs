//! Time tracker models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Per-account time tracking record. At most one exists per `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTracker {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_sedentary_time: f64,
    pub total_break_time: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeTracker {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            total_sedentary_time: 0.0,
            total_break_time: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeTrackerRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
}

/// Fields a client may change on a tracker. Anything else in the body,
/// `userId` included, is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrackerUpdate {
    #[validate(range(min = 0.0, message = "totalSedentaryTime cannot be negative"))]
    pub total_sedentary_time: Option<f64>,
    #[validate(range(min = 0.0, message = "totalBreakTime cannot be negative"))]
    pub total_break_time: Option<f64>,
}

impl TimeTrackerUpdate {
    pub fn apply(&self, tracker: &mut TimeTracker) {
        if let Some(total) = self.total_sedentary_time {
            tracker.total_sedentary_time = total;
        }
        if let Some(total) = self.total_break_time {
            tracker.total_break_time = total;
        }
        tracker.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_ignores_fields_outside_allow_list() {
        let update: TimeTrackerUpdate = serde_json::from_value(serde_json::json!({
            "userId": "00000000-0000-0000-0000-000000000000",
            "id": "00000000-0000-0000-0000-000000000000",
            "totalBreakTime": 12.5
        }))
        .unwrap();

        let mut tracker = TimeTracker::new(Uuid::new_v4());
        let (id, owner) = (tracker.id, tracker.user_id);
        update.apply(&mut tracker);

        assert_eq!(tracker.id, id);
        assert_eq!(tracker.user_id, owner);
        assert_eq!(tracker.total_break_time, 12.5);
        assert_eq!(tracker.total_sedentary_time, 0.0);
    }

    #[test]
    fn test_update_rejects_negative_totals() {
        let update = TimeTrackerUpdate {
            total_sedentary_time: Some(-1.0),
            total_break_time: None,
        };
        assert!(update.validate().is_err());
        assert!(TimeTrackerUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_json_shape() {
        let tracker = TimeTracker::new(Uuid::new_v4());
        let json = serde_json::to_value(&tracker).unwrap();
        for key in ["id", "userId", "totalSedentaryTime", "totalBreakTime", "createdAt", "updatedAt"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
