use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::entity::{
    BookingCreate, Consultation, ConsultationSlot, ConsultationWithSlot, SlotCreate,
};

pub static DEFAULT_SLOT_MINUTES: i32 = 60;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SlotCreateBody {
    #[validate(required(message = "Date and time are required"))]
    pub date: Option<NaiveDate>,
    #[validate(required(message = "Date and time are required"))]
    pub time: Option<NaiveTime>,
    #[validate(range(min = 1, max = 480, message = "Duration must be between 1 and 480 minutes"))]
    pub duration_minutes: Option<i32>,
}

impl SlotCreateBody {
    pub fn into_create(self) -> SlotCreate {
        SlotCreate {
            date: self.date.unwrap_or_default(),
            time: self.time.unwrap_or_default(),
            duration_minutes: self.duration_minutes.unwrap_or(DEFAULT_SLOT_MINUTES),
        }
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct BookingBody {
    #[validate(required(message = "Slot ID and topic are required"))]
    pub slot_id: Option<Uuid>,
    #[validate(
        required(message = "Slot ID and topic are required"),
        length(min = 1, message = "Slot ID and topic are required")
    )]
    pub topic: Option<String>,
    pub description: Option<String>,
}

impl BookingBody {
    pub fn into_create(self, user_id: Uuid) -> BookingCreate {
        BookingCreate {
            slot_id: self.slot_id.unwrap_or_default(),
            user_id,
            topic: self.topic.unwrap_or_default(),
            description: self.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SlotListResponse {
    pub slots: Vec<ConsultationSlot>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SlotResponse {
    pub message: String,
    pub slot: ConsultationSlot,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BookingResponse {
    pub message: String,
    pub booking: Consultation,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConsultationListResponse {
    pub consultations: Vec<ConsultationWithSlot>,
}
