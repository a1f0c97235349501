use std::collections::HashMap;
use sqlx::{PgConnection, PgPool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;
use shared::lifecycle::{ends_at_from_countdown, ensure_editable, total_votes};
use shared::models::*;
use shared::validation::PollDraft;
use crate::store::{PollStore, StoreError};

// Serialises activations so two concurrent requests cannot both win.
const ACTIVATION_LOCK_KEY: i64 = 0x706f_6c6c;

const POLL_COLUMNS: &str = "id, question, is_active, created_at, ends_at, countdown_minutes";

#[derive(sqlx::FromRow)]
struct PollRow {
    id: Uuid,
    question: String,
    is_active: bool,
    created_at: OffsetDateTime,
    ends_at: Option<OffsetDateTime>,
    countdown_minutes: Option<i32>,
}

impl PollRow {
    fn into_poll(self, options: Vec<PollOption>) -> Poll {
        Poll {
            id: self.id,
            question: self.question,
            is_active: self.is_active,
            created_at: self.created_at,
            ends_at: self.ends_at,
            countdown_minutes: self.countdown_minutes,
            options,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OwnedOptionRow {
    id: Uuid,
    poll_id: Uuid,
    text: String,
}

pub struct PgPollStore {
    pool: PgPool,
}

impl PgPollStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn fetch_options(conn: &mut PgConnection, poll_id: Uuid) -> Result<Vec<PollOption>, StoreError> {
    let options = sqlx::query_as::<_, PollOption>(
        "SELECT id, text FROM poll_options WHERE poll_id = $1 ORDER BY position"
    )
    .bind(poll_id)
    .fetch_all(conn)
    .await?;
    Ok(options)
}

async fn insert_options(conn: &mut PgConnection, poll_id: Uuid, texts: &[String]) -> Result<Vec<PollOption>, StoreError> {
    let mut options = Vec::with_capacity(texts.len());
    for (position, text) in texts.iter().enumerate() {
        let option = PollOption { id: Uuid::new_v4(), text: text.clone() };
        sqlx::query(
            "INSERT INTO poll_options (id, poll_id, text, position) VALUES ($1, $2, $3, $4)"
        )
        .bind(option.id)
        .bind(poll_id)
        .bind(&option.text)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
        options.push(option);
    }
    Ok(options)
}

// The option vanished between the SELECT and the foreign key check.
fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23503")
}

#[rocket::async_trait]
impl PollStore for PgPollStore {
    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let rows = sqlx::query_as::<_, PollRow>(&format!(
            "SELECT {POLL_COLUMNS} FROM polls ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let option_rows = sqlx::query_as::<_, OwnedOptionRow>(
            "SELECT id, poll_id, text FROM poll_options WHERE poll_id = ANY($1) ORDER BY position"
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut options: HashMap<Uuid, Vec<PollOption>> = HashMap::with_capacity(rows.len());
        for row in option_rows {
            options.entry(row.poll_id).or_default().push(PollOption { id: row.id, text: row.text });
        }

        Ok(rows.into_iter()
            .map(|row| {
                let poll_options = options.remove(&row.id).unwrap_or_default();
                row.into_poll(poll_options)
            })
            .collect())
    }

    async fn create_poll(&self, draft: &PollDraft, now: OffsetDateTime) -> Result<Poll, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PollRow>(&format!(
            "INSERT INTO polls (id, question, is_active, created_at, ends_at, countdown_minutes)
             VALUES ($1, $2, FALSE, $3, $4, $5)
             RETURNING {POLL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.question)
        .bind(now)
        .bind(draft.ends_at)
        .bind(draft.countdown_minutes)
        .fetch_one(&mut *tx)
        .await?;

        let options = insert_options(&mut tx, row.id, &draft.options).await?;
        tx.commit().await?;
        Ok(row.into_poll(options))
    }

    async fn update_poll(&self, id: Uuid, draft: &PollDraft) -> Result<Poll, StoreError> {
        let mut tx = self.pool.begin().await?;

        let is_active = sqlx::query_scalar::<_, bool>("SELECT is_active FROM polls WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;

        // Vote inserts on these options block until the edit commits.
        sqlx::query("SELECT id FROM poll_options WHERE poll_id = $1 FOR UPDATE")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let recorded = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM votes v JOIN poll_options o ON o.id = v.option_id WHERE o.poll_id = $1"
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        ensure_editable(is_active, recorded)?;

        sqlx::query("DELETE FROM poll_options WHERE poll_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let options = insert_options(&mut tx, id, &draft.options).await?;

        let row = sqlx::query_as::<_, PollRow>(&format!(
            "UPDATE polls SET question = $2, ends_at = $3, countdown_minutes = $4
             WHERE id = $1
             RETURNING {POLL_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.question)
        .bind(draft.ends_at)
        .bind(draft.countdown_minutes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into_poll(options))
    }

    async fn activate_poll(&self, id: Uuid, now: OffsetDateTime) -> Result<Poll, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ACTIVATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let countdown_minutes = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT countdown_minutes FROM polls WHERE id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        sqlx::query("UPDATE polls SET is_active = FALSE WHERE is_active AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let purged = sqlx::query("DELETE FROM votes")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let row = sqlx::query_as::<_, PollRow>(&format!(
            "UPDATE polls SET is_active = TRUE, ends_at = $2 WHERE id = $1 RETURNING {POLL_COLUMNS}"
        ))
        .bind(id)
        .bind(ends_at_from_countdown(now, countdown_minutes))
        .fetch_one(&mut *tx)
        .await?;

        let options = fetch_options(&mut tx, id).await?;
        tx.commit().await?;

        info!(poll_id = %id, purged, "Activated poll");
        Ok(row.into_poll(options))
    }

    async fn deactivate_poll(&self, id: Uuid) -> Result<Poll, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, PollRow>(&format!(
            "UPDATE polls SET is_active = FALSE, ends_at = NULL WHERE id = $1 RETURNING {POLL_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StoreError::NotFound)?;

        let options = fetch_options(&mut conn, id).await?;
        Ok(row.into_poll(options))
    }

    async fn delete_poll(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM votes WHERE option_id IN (SELECT id FROM poll_options WHERE poll_id = $1)")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM poll_options WHERE poll_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM polls WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn active_poll(&self) -> Result<Option<ActivePoll>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, PollRow>(&format!(
            "SELECT {POLL_COLUMNS} FROM polls WHERE is_active LIMIT 1"
        ))
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else { return Ok(None) };

        let options = sqlx::query_as::<_, OptionTally>(
            "SELECT o.id, o.text, COUNT(v.id) AS votes
             FROM poll_options o
             LEFT JOIN votes v ON v.option_id = o.id
             WHERE o.poll_id = $1
             GROUP BY o.id, o.text, o.position
             ORDER BY o.position"
        )
        .bind(row.id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(ActivePoll {
            id: row.id,
            question: row.question,
            created_at: row.created_at,
            ends_at: row.ends_at,
            countdown_minutes: row.countdown_minutes,
            total_votes: total_votes(&options),
            options,
        }))
    }

    async fn cast_vote(&self, option_id: Uuid, now: OffsetDateTime) -> Result<(), StoreError> {
        let inserted = sqlx::query(
            "INSERT INTO votes (option_id, cast_at) SELECT id, $2 FROM poll_options WHERE id = $1"
        )
        .bind(option_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| if is_foreign_key_violation(&e) { StoreError::NotFound } else { e.into() })?
        .rows_affected();

        if inserted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::lifecycle::LifecycleError;
    use sqlx::postgres::PgPoolOptions;
    use time::Duration;
    use tokio::sync::{Mutex, MutexGuard};

    // One shared database; activation touches every row.
    static DATABASE: Mutex<()> = Mutex::const_new(());

    /// A store over a migrated, empty database. `None` when `DATABASE_URL` is unset.
    async fn store() -> Option<(PgPollStore, MutexGuard<'static, ()>)> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres store test");
            return None;
        };

        let guard = DATABASE.lock().await;
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .expect("database reachable");
        sqlx::migrate!("./migrations").run(&pool).await.expect("migrations apply");
        sqlx::query("TRUNCATE votes, poll_options, polls")
            .execute(&pool)
            .await
            .expect("tables truncated");

        Some((PgPollStore::new(pool), guard))
    }

    // Postgres keeps microseconds.
    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc().replace_nanosecond(0).unwrap()
    }

    fn draft(question: &str, options: &[&str], countdown_minutes: Option<i32>) -> PollDraft {
        PollDraft {
            question: question.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            ends_at: None,
            countdown_minutes,
        }
    }

    async fn vote_count(store: &PgPollStore) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM votes")
            .fetch_one(&store.pool)
            .await
            .unwrap()
    }

    async fn find(store: &PgPollStore, id: Uuid) -> Poll {
        store.list_polls().await.unwrap().into_iter().find(|p| p.id == id).unwrap()
    }

    #[rocket::async_test]
    async fn activation_is_exclusive_and_purges_votes() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        let a = store.create_poll(&draft("A?", &["1", "2"], None), now).await.unwrap();
        let b = store.create_poll(&draft("B?", &["3", "4"], Some(10)), now).await.unwrap();

        store.activate_poll(a.id, now).await.unwrap();
        store.cast_vote(a.options[0].id, now).await.unwrap();
        store.cast_vote(b.options[1].id, now).await.unwrap();
        assert_eq!(vote_count(&store).await, 2);

        let b = store.activate_poll(b.id, now).await.unwrap();
        assert!(b.is_active);
        assert_eq!(b.ends_at, Some(now + Duration::minutes(10)));
        assert!(!find(&store, a.id).await.is_active);
        assert_eq!(vote_count(&store).await, 0);

        let active = store.active_poll().await.unwrap().unwrap();
        assert_eq!(active.id, b.id);
        assert_eq!(active.total_votes, 0);
    }

    #[rocket::async_test]
    async fn schema_allows_one_active_poll() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        let a = store.create_poll(&draft("A?", &["1", "2"], None), now).await.unwrap();
        let b = store.create_poll(&draft("B?", &["3", "4"], None), now).await.unwrap();
        store.activate_poll(a.id, now).await.unwrap();

        let second = sqlx::query("UPDATE polls SET is_active = TRUE WHERE id = $1")
            .bind(b.id)
            .execute(&store.pool)
            .await;
        assert!(second.is_err());
        assert!(!find(&store, b.id).await.is_active);
    }

    #[rocket::async_test]
    async fn missing_poll_activation_leaves_votes() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        let a = store.create_poll(&draft("A?", &["1", "2"], None), now).await.unwrap();
        store.activate_poll(a.id, now).await.unwrap();
        store.cast_vote(a.options[0].id, now).await.unwrap();

        assert!(matches!(store.activate_poll(Uuid::new_v4(), now).await, Err(StoreError::NotFound)));
        assert_eq!(vote_count(&store).await, 1);
        let active = store.active_poll().await.unwrap().unwrap();
        assert_eq!(active.id, a.id);
        assert_eq!(active.total_votes, 1);
    }

    #[rocket::async_test]
    async fn edit_replaces_options_in_submitted_order() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        let poll = store.create_poll(&draft("Q?", &["1", "2"], Some(5)), now).await.unwrap();

        let edited = store.update_poll(poll.id, &draft("New?", &["Z", "Y", "X"], None)).await.unwrap();
        assert_eq!(edited.question, "New?");
        assert_eq!(edited.countdown_minutes, None);

        let stored = find(&store, poll.id).await;
        assert_eq!(stored.options.iter().map(|o| o.text.as_str()).collect::<Vec<_>>(), vec!["Z", "Y", "X"]);
        assert_eq!(stored.options, edited.options);

        for old in &poll.options {
            assert!(matches!(store.cast_vote(old.id, now).await, Err(StoreError::NotFound)));
        }
        assert_eq!(vote_count(&store).await, 0);
    }

    #[rocket::async_test]
    async fn edit_rejected_once_voted() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        let poll = store.create_poll(&draft("Q?", &["1", "2"], None), now).await.unwrap();
        store.cast_vote(poll.options[1].id, now).await.unwrap();

        let result = store.update_poll(poll.id, &draft("Other?", &["A", "B"], None)).await;
        assert!(matches!(result, Err(StoreError::Lifecycle(LifecycleError::NotEditable))));
        assert_eq!(find(&store, poll.id).await.options, poll.options);

        assert!(matches!(
            store.update_poll(Uuid::new_v4(), &draft("Q?", &["A", "B"], None)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[rocket::async_test]
    async fn racing_vote_and_edit_never_drop_an_accepted_vote() {
        let Some((store, _db)) = store().await else { return };
        let now = now();

        for _ in 0..20 {
            let poll = store.create_poll(&draft("Q?", &["1", "2"], None), now).await.unwrap();
            let replacement = draft("Q?", &["3", "4"], None);

            let (voted, edited) = tokio::join!(
                store.cast_vote(poll.options[0].id, now),
                store.update_poll(poll.id, &replacement),
            );

            let recorded = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM votes v JOIN poll_options o ON o.id = v.option_id WHERE o.poll_id = $1"
            )
            .bind(poll.id)
            .fetch_one(&store.pool)
            .await
            .unwrap();

            match (voted, edited) {
                (Ok(()), Err(StoreError::Lifecycle(_))) => assert_eq!(recorded, 1),
                (Err(StoreError::NotFound), Ok(_)) => assert_eq!(recorded, 0),
                (voted, edited) => panic!("inconsistent outcome: vote {voted:?}, edit {edited:?}"),
            }
        }
    }

    #[rocket::async_test]
    async fn unknown_option_vote_inserts_nothing() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        store.create_poll(&draft("Q?", &["1", "2"], None), now).await.unwrap();

        assert!(matches!(store.cast_vote(Uuid::new_v4(), now).await, Err(StoreError::NotFound)));
        assert_eq!(vote_count(&store).await, 0);
    }

    #[rocket::async_test]
    async fn tallies_follow_option_order() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        let poll = store.create_poll(&draft("Color?", &["Red", "Blue", "Green"], None), now).await.unwrap();
        store.activate_poll(poll.id, now).await.unwrap();
        store.cast_vote(poll.options[1].id, now).await.unwrap();
        store.cast_vote(poll.options[1].id, now).await.unwrap();
        store.cast_vote(poll.options[2].id, now).await.unwrap();

        let active = store.active_poll().await.unwrap().unwrap();
        let tallies: Vec<(&str, i64)> = active.options.iter().map(|o| (o.text.as_str(), o.votes)).collect();
        assert_eq!(tallies, vec![("Red", 0), ("Blue", 2), ("Green", 1)]);
        assert_eq!(active.total_votes, 3);
    }

    #[rocket::async_test]
    async fn delete_cascades_only_own_rows() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        let a = store.create_poll(&draft("A?", &["1", "2"], None), now).await.unwrap();
        let b = store.create_poll(&draft("B?", &["3", "4"], None), now).await.unwrap();
        store.cast_vote(a.options[0].id, now).await.unwrap();
        store.cast_vote(b.options[0].id, now).await.unwrap();

        store.delete_poll(a.id).await.unwrap();

        let polls = store.list_polls().await.unwrap();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].options, b.options);
        assert_eq!(vote_count(&store).await, 1);
        assert!(matches!(store.delete_poll(a.id).await, Err(StoreError::NotFound)));
    }

    #[rocket::async_test]
    async fn list_is_newest_first() {
        let Some((store, _db)) = store().await else { return };
        let now = now();
        store.create_poll(&draft("Old?", &["1", "2"], None), now - Duration::minutes(1)).await.unwrap();
        store.create_poll(&draft("New?", &["1", "2"], None), now).await.unwrap();

        let questions: Vec<String> = store.list_polls().await.unwrap().into_iter().map(|p| p.question).collect();
        assert_eq!(questions, vec!["New?", "Old?"]);
    }
}
