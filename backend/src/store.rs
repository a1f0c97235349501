use std::sync::{Mutex, MutexGuard};
use time::OffsetDateTime;
use tracing::{error, info};
use uuid::Uuid;
use shared::lifecycle::{ends_at_from_countdown, ensure_editable, total_votes, LifecycleError};
use shared::models::*;
use shared::validation::PollDraft;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("Failed to acquire store lock")]
    LockFailed,
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Durable home of polls, options and votes.
///
/// Every method is one atomic state transition: implementations must not
/// leave a half-applied activation, edit or delete behind on failure.
#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    /// All polls, newest first, options in submitted order.
    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError>;

    async fn create_poll(&self, draft: &PollDraft, now: OffsetDateTime) -> Result<Poll, StoreError>;

    /// Replaces question, end time, countdown and the whole option set.
    /// Fails with [`LifecycleError::NotEditable`] for active or voted polls.
    async fn update_poll(&self, id: Uuid, draft: &PollDraft) -> Result<Poll, StoreError>;

    /// Makes `id` the only active poll, drops every vote in the system and
    /// restarts the poll's countdown from `now`.
    async fn activate_poll(&self, id: Uuid, now: OffsetDateTime) -> Result<Poll, StoreError>;

    async fn deactivate_poll(&self, id: Uuid) -> Result<Poll, StoreError>;

    /// Removes the poll's votes, then its options, then the poll.
    async fn delete_poll(&self, id: Uuid) -> Result<(), StoreError>;

    async fn active_poll(&self) -> Result<Option<ActivePoll>, StoreError>;

    async fn cast_vote(&self, option_id: Uuid, now: OffsetDateTime) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct PollRecord {
    id: Uuid,
    question: String,
    is_active: bool,
    created_at: OffsetDateTime,
    ends_at: Option<OffsetDateTime>,
    countdown_minutes: Option<i32>,
}

#[derive(Debug, Clone)]
struct OptionRecord {
    id: Uuid,
    poll_id: Uuid,
    text: String,
}

#[derive(Debug, Clone)]
struct VoteRecord {
    option_id: Uuid,
    #[allow(dead_code)]
    cast_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct MemoryState {
    polls: Vec<PollRecord>,
    options: Vec<OptionRecord>,
    votes: Vec<VoteRecord>,
}

impl MemoryState {
    fn poll_index(&self, id: Uuid) -> Result<usize, StoreError> {
        self.polls.iter().position(|p| p.id == id).ok_or(StoreError::NotFound)
    }

    fn options_of(&self, poll_id: Uuid) -> impl Iterator<Item = &OptionRecord> {
        self.options.iter().filter(move |o| o.poll_id == poll_id)
    }

    fn votes_for(&self, option_id: Uuid) -> i64 {
        self.votes.iter().filter(|v| v.option_id == option_id).count() as i64
    }

    fn to_poll(&self, record: &PollRecord) -> Poll {
        Poll {
            id: record.id,
            question: record.question.clone(),
            is_active: record.is_active,
            created_at: record.created_at,
            ends_at: record.ends_at,
            countdown_minutes: record.countdown_minutes,
            options: self.options_of(record.id)
                .map(|o| PollOption { id: o.id, text: o.text.clone() })
                .collect(),
        }
    }

    fn push_options(&mut self, poll_id: Uuid, texts: &[String]) {
        self.options.extend(texts.iter().map(|text| OptionRecord {
            id: Uuid::new_v4(),
            poll_id,
            text: text.clone(),
        }));
    }
}

/// Process-local [`PollStore`]; all state sits behind one lock.
#[derive(Debug, Default)]
pub struct MemoryPollStore {
    state: Mutex<MemoryState>,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|e| {
            error!("Failed to acquire poll store lock: {}", e);
            StoreError::LockFailed
        })
    }
}

#[rocket::async_trait]
impl PollStore for MemoryPollStore {
    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let state = self.lock()?;
        // Reverse insertion order first so equal timestamps still list newest first.
        let mut polls: Vec<Poll> = state.polls.iter().rev().map(|p| state.to_poll(p)).collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls)
    }

    async fn create_poll(&self, draft: &PollDraft, now: OffsetDateTime) -> Result<Poll, StoreError> {
        let mut state = self.lock()?;
        let record = PollRecord {
            id: Uuid::new_v4(),
            question: draft.question.clone(),
            is_active: false,
            created_at: now,
            ends_at: draft.ends_at,
            countdown_minutes: draft.countdown_minutes,
        };
        state.push_options(record.id, &draft.options);
        let poll = state.to_poll(&record);
        state.polls.push(record);
        Ok(poll)
    }

    async fn update_poll(&self, id: Uuid, draft: &PollDraft) -> Result<Poll, StoreError> {
        let mut state = self.lock()?;
        let index = state.poll_index(id)?;

        let recorded: i64 = state.options_of(id).map(|o| state.votes_for(o.id)).sum();
        ensure_editable(state.polls[index].is_active, recorded)?;

        state.options.retain(|o| o.poll_id != id);
        state.push_options(id, &draft.options);

        let record = &mut state.polls[index];
        record.question = draft.question.clone();
        record.ends_at = draft.ends_at;
        record.countdown_minutes = draft.countdown_minutes;

        let record = state.polls[index].clone();
        Ok(state.to_poll(&record))
    }

    async fn activate_poll(&self, id: Uuid, now: OffsetDateTime) -> Result<Poll, StoreError> {
        let mut state = self.lock()?;
        let index = state.poll_index(id)?;

        for poll in state.polls.iter_mut() {
            poll.is_active = false;
        }
        let purged = state.votes.len();
        state.votes.clear();

        let record = &mut state.polls[index];
        record.is_active = true;
        record.ends_at = ends_at_from_countdown(now, record.countdown_minutes);
        info!(poll_id = %id, purged, "Activated poll");

        let record = state.polls[index].clone();
        Ok(state.to_poll(&record))
    }

    async fn deactivate_poll(&self, id: Uuid) -> Result<Poll, StoreError> {
        let mut state = self.lock()?;
        let index = state.poll_index(id)?;

        let record = &mut state.polls[index];
        record.is_active = false;
        record.ends_at = None;

        let record = state.polls[index].clone();
        Ok(state.to_poll(&record))
    }

    async fn delete_poll(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let index = state.poll_index(id)?;

        let option_ids: Vec<Uuid> = state.options_of(id).map(|o| o.id).collect();
        state.votes.retain(|v| !option_ids.contains(&v.option_id));
        state.options.retain(|o| o.poll_id != id);
        state.polls.remove(index);
        Ok(())
    }

    async fn active_poll(&self) -> Result<Option<ActivePoll>, StoreError> {
        let state = self.lock()?;
        let Some(record) = state.polls.iter().find(|p| p.is_active) else { return Ok(None) };

        let options: Vec<OptionTally> = state.options_of(record.id)
            .map(|o| OptionTally { id: o.id, text: o.text.clone(), votes: state.votes_for(o.id) })
            .collect();

        Ok(Some(ActivePoll {
            id: record.id,
            question: record.question.clone(),
            created_at: record.created_at,
            ends_at: record.ends_at,
            countdown_minutes: record.countdown_minutes,
            total_votes: total_votes(&options),
            options,
        }))
    }

    async fn cast_vote(&self, option_id: Uuid, now: OffsetDateTime) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.options.iter().any(|o| o.id == option_id) {
            return Err(StoreError::NotFound);
        }
        state.votes.push(VoteRecord { option_id, cast_at: now });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn draft(question: &str, options: &[&str], countdown_minutes: Option<i32>) -> PollDraft {
        PollDraft {
            question: question.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            ends_at: None,
            countdown_minutes,
        }
    }

    #[rocket::async_test]
    async fn activation_is_exclusive_and_purges_votes() {
        let store = MemoryPollStore::new();
        let now = OffsetDateTime::now_utc();
        let a = store.create_poll(&draft("A?", &["1", "2"], None), now).await.unwrap();
        let b = store.create_poll(&draft("B?", &["3", "4"], Some(10)), now).await.unwrap();

        store.activate_poll(a.id, now).await.unwrap();
        store.cast_vote(a.options[0].id, now).await.unwrap();
        store.cast_vote(b.options[1].id, now).await.unwrap();

        let b = store.activate_poll(b.id, now).await.unwrap();
        assert!(b.is_active);
        assert_eq!(b.ends_at, Some(now + Duration::minutes(10)));
        let polls = store.list_polls().await.unwrap();
        assert!(!polls.iter().find(|p| p.id == a.id).unwrap().is_active);

        let active = store.active_poll().await.unwrap().unwrap();
        assert_eq!(active.id, b.id);
        assert_eq!(active.total_votes, 0);
        assert!(store.lock().unwrap().votes.is_empty());
    }

    #[rocket::async_test]
    async fn missing_poll_activation_changes_nothing() {
        let store = MemoryPollStore::new();
        let now = OffsetDateTime::now_utc();
        let a = store.create_poll(&draft("A?", &["1", "2"], None), now).await.unwrap();
        store.activate_poll(a.id, now).await.unwrap();
        store.cast_vote(a.options[0].id, now).await.unwrap();

        assert!(matches!(store.activate_poll(Uuid::new_v4(), now).await, Err(StoreError::NotFound)));
        let active = store.active_poll().await.unwrap().unwrap();
        assert_eq!(active.id, a.id);
        assert_eq!(active.total_votes, 1);
    }

    #[rocket::async_test]
    async fn delete_cascades_only_own_rows() {
        let store = MemoryPollStore::new();
        let now = OffsetDateTime::now_utc();
        let a = store.create_poll(&draft("A?", &["1", "2"], None), now).await.unwrap();
        let b = store.create_poll(&draft("B?", &["3", "4"], None), now).await.unwrap();
        store.cast_vote(a.options[0].id, now).await.unwrap();
        store.cast_vote(b.options[0].id, now).await.unwrap();

        store.delete_poll(a.id).await.unwrap();

        let state = store.lock().unwrap();
        assert_eq!(state.polls.len(), 1);
        assert!(state.options.iter().all(|o| o.poll_id == b.id));
        assert_eq!(state.votes.len(), 1);
        assert_eq!(state.votes[0].option_id, b.options[0].id);
    }

    #[rocket::async_test]
    async fn list_is_newest_first() {
        let store = MemoryPollStore::new();
        let now = OffsetDateTime::now_utc();
        store.create_poll(&draft("Old?", &["1", "2"], None), now - Duration::minutes(1)).await.unwrap();
        store.create_poll(&draft("New?", &["1", "2"], None), now).await.unwrap();
        store.create_poll(&draft("Same time?", &["1", "2"], None), now).await.unwrap();

        let questions: Vec<String> = store.list_polls().await.unwrap().into_iter().map(|p| p.question).collect();
        assert_eq!(questions, vec!["Same time?", "New?", "Old?"]);
    }
}
