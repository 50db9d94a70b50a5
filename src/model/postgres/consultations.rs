use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

use crate::model::entity::{
    BookingCreate, Consultation, ConsultationSlot, ConsultationStatus, ConsultationWithSlot,
    SlotCreate,
};
use crate::model::{
    ConsultationRepository, DatabaseError, DatabaseResult, PgStore, ResourceType,
};

#[async_trait]
impl ConsultationRepository for PgStore {
    async fn create_slot(&self, data: SlotCreate) -> DatabaseResult<ConsultationSlot> {
        let result = sqlx::query_as(
            "INSERT INTO consultation_slots (id, slot_date, slot_time, duration_minutes) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.date)
        .bind(data.time)
        .bind(data.duration_minutes)
        .fetch_one(self.executor())
        .await?;
        Ok(result)
    }

    async fn list_available_slots(&self, today: NaiveDate) -> DatabaseResult<Vec<ConsultationSlot>> {
        let result = sqlx::query_as(
            "SELECT * FROM consultation_slots \
             WHERE is_booked = FALSE AND slot_date >= $1 \
             ORDER BY slot_date ASC, slot_time ASC",
        )
        .bind(today)
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }

    async fn book(&self, data: BookingCreate, today: NaiveDate) -> DatabaseResult<Consultation> {
        let mut tx = self.executor().begin().await?;

        // the row lock taken by this UPDATE serialises concurrent bookings of one slot
        let slot: Option<ConsultationSlot> = sqlx::query_as(
            "UPDATE consultation_slots SET is_booked = TRUE \
             WHERE id = $1 AND is_booked = FALSE AND slot_date >= $2 RETURNING *",
        )
        .bind(data.slot_id)
        .bind(today)
        .fetch_optional(&mut *tx)
        .await?;

        if slot.is_none() {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM consultation_slots WHERE id = $1)")
                    .bind(data.slot_id)
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Err(if exists {
                DatabaseError::SlotUnavailable
            } else {
                DatabaseError::NotFound(ResourceType::ConsultationSlot)
            });
        }

        let consultation: Consultation = sqlx::query_as(
            "INSERT INTO consultations (id, user_id, slot_id, topic, description, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.slot_id)
        .bind(&data.topic)
        .bind(&data.description)
        .bind(ConsultationStatus::Scheduled.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(consultation)
    }

    async fn find_consultation(&self, id: Uuid) -> DatabaseResult<Option<Consultation>> {
        let result = sqlx::query_as("SELECT * FROM consultations WHERE id = $1")
            .bind(id)
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn cancel(&self, id: Uuid) -> DatabaseResult<Consultation> {
        let mut tx = self.executor().begin().await?;

        let cancelled: Option<Consultation> = sqlx::query_as(
            "UPDATE consultations SET status = $1, updated_at = now() \
             WHERE id = $2 AND status = $3 RETURNING *",
        )
        .bind(ConsultationStatus::Cancelled.to_string())
        .bind(id)
        .bind(ConsultationStatus::Scheduled.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(cancelled) = cancelled else {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM consultations WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Err(if exists {
                DatabaseError::NotScheduled
            } else {
                DatabaseError::NotFound(ResourceType::Consultation)
            });
        };

        sqlx::query("UPDATE consultation_slots SET is_booked = FALSE WHERE id = $1")
            .bind(cancelled.slot_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(cancelled)
    }

    async fn list_consultations(
        &self,
        user_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<ConsultationWithSlot>> {
        let consultations: Vec<Consultation> = sqlx::query_as(
            "SELECT * FROM consultations WHERE ($1::UUID IS NULL OR user_id = $1) \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.executor())
        .await?;

        let slot_ids: Vec<Uuid> = consultations.iter().map(|c| c.slot_id).collect();
        let slots: Vec<ConsultationSlot> =
            sqlx::query_as("SELECT * FROM consultation_slots WHERE id = ANY($1)")
                .bind(&slot_ids)
                .fetch_all(self.executor())
                .await?;
        let slots: HashMap<Uuid, ConsultationSlot> = slots.into_iter().map(|s| (s.id, s)).collect();

        Ok(consultations
            .into_iter()
            .map(|consultation| ConsultationWithSlot {
                slot: slots.get(&consultation.slot_id).cloned(),
                consultation,
            })
            .collect())
    }
}
