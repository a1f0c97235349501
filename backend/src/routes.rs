use rocket::{State, get, post, put, patch, delete, http::Status, serde::json::{self, Json}};
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use shared::models::*;
use crate::{
    error::ApiError,
    processor::PollProcessor,
    queries::PgPollStore,
    store::PollStore,
    utils::parse_poll_id,
};

pub struct AppState {
    pub store: Box<dyn PollStore>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self::with_store(PgPollStore::new(pool))
    }

    pub fn with_store(store: impl PollStore + 'static) -> Self {
        Self { store: Box::new(store) }
    }

    fn store(&self) -> &dyn PollStore {
        self.store.as_ref()
    }
}

type JsonBody<'r, T> = Result<Json<T>, json::Error<'r>>;

fn read_body<T>(body: JsonBody<'_, T>) -> Result<T, ApiError> {
    body.map(Json::into_inner).map_err(|e| {
        let reason = match e {
            json::Error::Io(e) => e.to_string(),
            json::Error::Parse(_, e) => e.to_string(),
        };
        debug!("Rejected request body: {}", reason);
        ApiError::MalformedBody(reason)
    })
}

#[get("/polls")]
pub async fn list_polls(state: &State<AppState>) -> Result<Json<Vec<Poll>>, ApiError> {
    PollProcessor::list_polls(state.store()).await.map(Json)
}

#[instrument(skip(state, request))]
#[post("/polls", data = "<request>")]
pub async fn create_poll(
    state: &State<AppState>,
    request: JsonBody<'_, PollRequest>,
) -> Result<Json<Poll>, ApiError> {
    let request = read_body(request)?;
    PollProcessor::create_poll(state.store(), &request, OffsetDateTime::now_utc())
        .await
        .map(Json)
}

#[instrument(skip(state, request))]
#[put("/polls/<id>", data = "<request>")]
pub async fn update_poll(
    state: &State<AppState>,
    id: &str,
    request: JsonBody<'_, PollRequest>,
) -> Result<Json<Poll>, ApiError> {
    let id = parse_poll_id(id)?;
    let request = read_body(request)?;
    PollProcessor::update_poll(state.store(), id, &request, OffsetDateTime::now_utc())
        .await
        .map(Json)
}

#[instrument(skip(state, request))]
#[patch("/polls/<id>", data = "<request>")]
pub async fn set_poll_active(
    state: &State<AppState>,
    id: &str,
    request: JsonBody<'_, SetActiveRequest>,
) -> Result<Json<Poll>, ApiError> {
    let id = parse_poll_id(id)?;
    let request = read_body(request)?;
    PollProcessor::set_active(state.store(), id, request.is_active, OffsetDateTime::now_utc())
        .await
        .map(Json)
}

#[instrument(skip(state))]
#[delete("/polls/<id>")]
pub async fn delete_poll(state: &State<AppState>, id: &str) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_poll_id(id)?;
    PollProcessor::delete_poll(state.store(), id).await?;
    Ok(Json(SuccessResponse::ok()))
}

#[get("/vote")]
pub async fn get_active_poll(state: &State<AppState>) -> Result<Json<ActivePoll>, ApiError> {
    PollProcessor::active_poll(state.store()).await.map(Json)
}

#[instrument(skip(state, request))]
#[post("/vote", data = "<request>")]
pub async fn cast_vote(
    state: &State<AppState>,
    request: JsonBody<'_, VoteRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let request = read_body(request)?;
    PollProcessor::cast_vote(state.store(), &request, OffsetDateTime::now_utc()).await?;
    Ok(Json(SuccessResponse::ok()))
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
