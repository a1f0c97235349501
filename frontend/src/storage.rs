//! Remembers, per browser, which poll was voted on. Advisory only.

use uuid::Uuid;
use web_sys::Storage;
use crate::config::CONFIG;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedVote {
    pub option_id: Option<Uuid>,
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn read_id(storage: &Storage, key: &str) -> Option<Uuid> {
    storage.get_item(key).ok().flatten().and_then(|value| Uuid::parse_str(&value).ok())
}

/// The vote stored for `poll_id`, if this browser already voted on it.
pub fn recorded_vote(poll_id: Uuid) -> Option<RecordedVote> {
    let storage = local_storage()?;
    if read_id(&storage, CONFIG.voted_poll_key)? != poll_id {
        return None;
    }
    Some(RecordedVote { option_id: read_id(&storage, CONFIG.voted_option_key) })
}

pub fn remember_vote(poll_id: Uuid, option_id: Uuid) {
    let Some(storage) = local_storage() else { return };
    let _ = storage.set_item(CONFIG.voted_poll_key, &poll_id.to_string());
    let _ = storage.set_item(CONFIG.voted_option_key, &option_id.to_string());
}
