use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use shared::{models::*, error::ErrorResponse};
use crate::config::CONFIG;

fn url(path: &str) -> String {
    format!("{}{}", CONFIG.api_base_url, path)
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    if response.ok() {
        return response.json::<T>().await.map_err(|e| e.to_string());
    }

    let status = response.status();
    Err(response.json::<ErrorResponse>().await
        .map(|err| err.error)
        .unwrap_or_else(|_| format!("Request failed with status {}", status)))
}

async fn send(request: Request) -> Result<Response, String> {
    request.send().await.map_err(|e| e.to_string())
}

pub async fn fetch_polls() -> Result<Vec<Poll>, String> {
    read(send(Request::get(&url("/polls"))).await?).await
}

pub async fn create_poll(request: PollRequest) -> Result<Poll, String> {
    let req = Request::post(&url("/polls")).json(&request).map_err(|e| e.to_string())?;
    read(send(req).await?).await
}

pub async fn update_poll(id: Uuid, request: PollRequest) -> Result<Poll, String> {
    let req = Request::put(&url(&format!("/polls/{}", id))).json(&request).map_err(|e| e.to_string())?;
    read(send(req).await?).await
}

pub async fn set_active(id: Uuid, is_active: bool) -> Result<Poll, String> {
    let req = Request::patch(&url(&format!("/polls/{}", id)))
        .json(&SetActiveRequest { is_active })
        .map_err(|e| e.to_string())?;
    read(send(req).await?).await
}

pub async fn delete_poll(id: Uuid) -> Result<(), String> {
    read::<SuccessResponse>(send(Request::delete(&url(&format!("/polls/{}", id)))).await?)
        .await
        .map(|_| ())
}

pub async fn fetch_active_poll() -> Result<ActivePoll, String> {
    read(send(Request::get(&url("/vote"))).await?).await
}

pub async fn cast_vote(option_id: Uuid) -> Result<(), String> {
    let req = Request::post(&url("/vote"))
        .json(&VoteRequest { option_id: Some(option_id) })
        .map_err(|e| e.to_string())?;
    read::<SuccessResponse>(send(req).await?).await.map(|_| ())
}
