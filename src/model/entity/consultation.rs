use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{ResourceType, ResourceTyped};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ConsultationSlot {
    pub id: Uuid,
    #[sqlx(rename = "slot_date")]
    pub date: NaiveDate,
    #[sqlx(rename = "slot_time")]
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SlotCreate {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Error)]
#[error("unknown consultation status: {0}")]
pub struct UnknownStatus(String);

impl TryFrom<String> for ConsultationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatus(value)),
        }
    }
}

impl std::fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Consultation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slot_id: Uuid,
    pub topic: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ConsultationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConsultationWithSlot {
    #[serde(flatten)]
    pub consultation: Consultation,
    pub slot: Option<ConsultationSlot>,
}

#[derive(Debug, Clone)]
pub struct BookingCreate {
    pub slot_id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub description: Option<String>,
}

impl ResourceTyped for ConsultationSlot {
    fn get_resource_type() -> ResourceType {
        ResourceType::ConsultationSlot
    }
}

impl ResourceTyped for Consultation {
    fn get_resource_type() -> ResourceType {
        ResourceType::Consultation
    }
}

impl ConsultationSlot {
    pub fn new(data: SlotCreate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: data.date,
            time: data.time,
            duration_minutes: data.duration_minutes,
            is_booked: false,
            created_at: Utc::now(),
        }
    }

    /// Bookable on `today`: not booked and not in the past.
    pub fn is_available(&self, today: NaiveDate) -> bool {
        !self.is_booked && self.date >= today
    }
}

impl Consultation {
    pub fn new(data: BookingCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            slot_id: data.slot_id,
            topic: data.topic,
            description: data.description,
            status: ConsultationStatus::Scheduled,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Slots open for booking on `today`, earliest first.
pub fn available_slots<'a, I>(slots: I, today: NaiveDate) -> Vec<ConsultationSlot>
where
    I: IntoIterator<Item = &'a ConsultationSlot>,
{
    let mut slots: Vec<ConsultationSlot> = slots
        .into_iter()
        .filter(|slot| slot.is_available(today))
        .cloned()
        .collect();
    slots.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
    slots
}

#[cfg(test)]
mod test {
    use super::*;

    fn slot(date: NaiveDate, hour: u32, is_booked: bool) -> ConsultationSlot {
        let mut slot = ConsultationSlot::new(SlotCreate {
            date,
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            duration_minutes: 60,
        });
        slot.is_booked = is_booked;
        slot
    }

    #[test]
    fn available_slots_filters_and_sorts() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let yesterday = today.pred_opt().unwrap();
        let tomorrow = today.succ_opt().unwrap();

        let slots = vec![
            slot(tomorrow, 9, false),
            slot(yesterday, 9, false),
            slot(today, 15, false),
            slot(today, 10, true),
            slot(today, 11, false),
        ];

        let available = available_slots(&slots, today);
        let keys: Vec<_> = available.iter().map(|s| (s.date, s.time)).collect();

        assert_eq!(available.len(), 3);
        assert!(available.iter().all(|s| !s.is_booked && s.date >= today));
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(available[0].time, NaiveTime::from_hms_opt(11, 0, 0).unwrap());
        assert_eq!(available[2].date, tomorrow);
    }

    #[test]
    fn status_parsing() {
        assert_eq!(
            ConsultationStatus::try_from(String::from("cancelled")).unwrap(),
            ConsultationStatus::Cancelled
        );
        assert!(ConsultationStatus::try_from(String::from("pending")).is_err());
        assert_eq!(ConsultationStatus::Scheduled.to_string(), "scheduled");
    }
}
