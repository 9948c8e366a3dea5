//! Player fixtures, collection and balance views, seed control, and the
//! engine event log.
//!
//! The `/tests/...` routes seed players and cards the same way the rest of
//! the platform would; they exist so integration tests can build a world
//! without a collaborator store.

use chrono::Utc;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use crate::engine::event_log::EventEntry;
use crate::engine::types::{Card, CardId, CardSpec, UserId};
use crate::status_messages::ApiError;

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct NewPlayerRequest {
    pub name: String,
    pub earned_xp: u32,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct NewCardRequest {
    pub owner_id: UserId,
    #[serde(flatten)]
    pub card: CardSpec,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct SeedRequest {
    pub seed: u64,
}

/// A player account with the derived battle balance alongside the stored one.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PlayerView {
    pub id: UserId,
    pub name: String,
    pub earned_xp: u32,
    pub available_xp: u32,
    pub cards: Vec<CardId>,
}

/// The balance-reader contract: every figure derived on read.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct BalanceView {
    pub user_id: UserId,
    pub earned_xp: u32,
    pub invested_xp: u32,
    pub available_xp: u32,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct EventLogResponse {
    pub entries: Vec<EventEntry>,
    pub next_seq: Option<u64>,
    pub limit: usize,
}

/// Test endpoint: create a player account with a starting XP balance.
#[openapi]
#[post("/tests/players", format = "json", data = "<request>")]
pub async fn add_test_player(
    request: Json<NewPlayerRequest>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Created<String> {
    let mut gs = game_state.lock().await;
    let id = gs.add_player(&request.name, request.earned_xp);
    Created::new(format!("/players/{}", id))
}

/// Test endpoint: register a card into a player's collection.
#[openapi]
#[post("/tests/cards", format = "json", data = "<request>")]
pub async fn add_test_card(
    request: Json<NewCardRequest>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Created<String>, ApiError> {
    let mut gs = game_state.lock().await;
    let request = request.0;
    let id = gs.add_card(request.owner_id, request.card)?;
    Ok(Created::new(format!("/cards/{}", id)))
}

/// Reseed the engine RNG so dealt hands replay deterministically.
#[openapi]
#[post("/player/seed", format = "json", data = "<seed_req>")]
pub async fn set_seed(
    seed_req: Json<SeedRequest>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Json<String> {
    let mut gs = game_state.lock().await;
    gs.set_seed(seed_req.seed, Utc::now());
    Json(format!("seed set to {}", seed_req.seed))
}

#[openapi]
#[get("/players/<id>")]
pub async fn get_player(
    id: UserId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<PlayerView>, ApiError> {
    let gs = game_state.lock().await;
    let available_xp = gs.available_xp(id)?;
    let player = gs.player(id)?;
    Ok(Json(PlayerView {
        id: player.id,
        name: player.name.clone(),
        earned_xp: player.earned_xp,
        available_xp,
        cards: player.cards.clone(),
    }))
}

#[openapi]
#[get("/players/<id>/balance")]
pub async fn get_balance(
    id: UserId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<BalanceView>, ApiError> {
    let gs = game_state.lock().await;
    Ok(Json(BalanceView {
        user_id: id,
        earned_xp: gs.player(id)?.earned_xp,
        invested_xp: gs.invested_xp(id)?,
        available_xp: gs.available_xp(id)?,
    }))
}

#[openapi]
#[get("/players/<id>/cards")]
pub async fn list_player_cards(
    id: UserId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let gs = game_state.lock().await;
    Ok(Json(gs.cards_of(id)?))
}

/// Paged view of the append-only engine event log.
#[openapi]
#[get("/events?<from_seq>&<limit>")]
pub async fn list_events(
    from_seq: Option<u64>,
    limit: Option<usize>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Json<EventLogResponse> {
    let gs = game_state.lock().await;
    let mut filtered: Vec<EventEntry> = gs
        .event_log
        .entries()
        .into_iter()
        .filter(|e| from_seq.map(|f| e.seq >= f).unwrap_or(true))
        .collect();
    let max = limit.unwrap_or(1000);
    let has_more = filtered.len() > max;
    filtered.truncate(max);
    let next_seq = if has_more {
        filtered.last().map(|e| e.seq + 1)
    } else {
        None
    };
    Json(EventLogResponse {
        entries: filtered,
        next_seq,
        limit: max,
    })
}
