use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;
use shared::models::*;
use shared::validation::{validate_poll_request, ValidationError};
use crate::error::ApiError;
use crate::store::PollStore;

const POLL_NOT_FOUND: &str = "Poll not found";
const OPTION_NOT_FOUND: &str = "Option not found";
const NO_ACTIVE_POLL: &str = "No active poll";

/// Poll lifecycle operations: validation first, then one store transition.
pub struct PollProcessor;

impl PollProcessor {
    pub async fn list_polls(store: &dyn PollStore) -> Result<Vec<Poll>, ApiError> {
        store.list_polls()
            .await
            .map_err(|e| ApiError::from_store(e, POLL_NOT_FOUND))
    }

    pub async fn create_poll(store: &dyn PollStore, request: &PollRequest, now: OffsetDateTime) -> Result<Poll, ApiError> {
        let draft = validate_poll_request(request, now).map_err(|e| {
            debug!("Rejected poll creation: {}", e);
            e
        })?;

        let poll = store.create_poll(&draft, now)
            .await
            .map_err(|e| ApiError::from_store(e, POLL_NOT_FOUND))?;

        info!(poll_id = %poll.id, options = poll.options.len(), "Created poll");
        Ok(poll)
    }

    pub async fn update_poll(store: &dyn PollStore, id: Uuid, request: &PollRequest, now: OffsetDateTime) -> Result<Poll, ApiError> {
        let draft = validate_poll_request(request, now)?;

        let poll = store.update_poll(id, &draft)
            .await
            .map_err(|e| ApiError::from_store(e, POLL_NOT_FOUND))?;

        info!(poll_id = %id, options = poll.options.len(), "Replaced poll contents");
        Ok(poll)
    }

    pub async fn set_active(store: &dyn PollStore, id: Uuid, is_active: bool, now: OffsetDateTime) -> Result<Poll, ApiError> {
        let result = if is_active {
            store.activate_poll(id, now).await
        } else {
            store.deactivate_poll(id).await
        };

        let poll = result.map_err(|e| ApiError::from_store(e, POLL_NOT_FOUND))?;
        if !is_active {
            info!(poll_id = %id, "Deactivated poll");
        }
        Ok(poll)
    }

    pub async fn delete_poll(store: &dyn PollStore, id: Uuid) -> Result<(), ApiError> {
        store.delete_poll(id)
            .await
            .map_err(|e| ApiError::from_store(e, POLL_NOT_FOUND))?;

        info!(poll_id = %id, "Deleted poll");
        Ok(())
    }

    pub async fn active_poll(store: &dyn PollStore) -> Result<ActivePoll, ApiError> {
        store.active_poll()
            .await
            .map_err(|e| ApiError::from_store(e, NO_ACTIVE_POLL))?
            .ok_or(ApiError::NotFound(NO_ACTIVE_POLL))
    }

    /// Records one vote. Whether the option's poll is open is not checked here.
    pub async fn cast_vote(store: &dyn PollStore, request: &VoteRequest, now: OffsetDateTime) -> Result<(), ApiError> {
        let option_id = request.option_id.ok_or(ValidationError::MissingOptionId)?;

        store.cast_vote(option_id, now)
            .await
            .map_err(|e| ApiError::from_store(e, OPTION_NOT_FOUND))?;

        debug!(option_id = %option_id, "Recorded vote");
        Ok(())
    }
}
