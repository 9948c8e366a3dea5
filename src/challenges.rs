//! Dealing and challenge-lifecycle endpoints.
//!
//! A hand is dealt by POST and read back by GET: the committed set never
//! changes on a retried read, only an explicit re-deal rolls again.

use chrono::Utc;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use crate::engine::types::{ChallengeDraft, ChallengeId, ChallengeView, CounterStake, DealtHand, UserId};
use crate::status_messages::ApiError;

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DeclineRequest {
    pub user_id: UserId,
}

#[openapi]
#[post("/players/<user_id>/deal")]
pub async fn deal_hand(
    user_id: UserId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<DealtHand>, ApiError> {
    let mut gs = game_state.lock().await;
    let hand = gs.deal_hand(user_id, Utc::now())?;
    Ok(Json(hand))
}

#[openapi]
#[get("/players/<user_id>/deal")]
pub async fn get_dealt_hand(
    user_id: UserId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<DealtHand>, ApiError> {
    let gs = game_state.lock().await;
    let hand = gs.committed_hand(user_id)?.clone();
    Ok(Json(hand))
}

#[openapi]
#[post("/challenges", format = "json", data = "<draft>")]
pub async fn create_challenge(
    draft: Json<ChallengeDraft>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Created<Json<ChallengeView>>, ApiError> {
    let mut gs = game_state.lock().await;
    let view = gs.create_challenge(draft.0, Utc::now())?;
    Ok(Created::new(format!("/challenges/{}", view.id)).body(Json(view)))
}

#[openapi]
#[get("/challenges?<user_id>")]
pub async fn list_challenges(
    user_id: Option<UserId>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Json<Vec<ChallengeView>> {
    let gs = game_state.lock().await;
    Json(gs.challenges_of(user_id, Utc::now()))
}

#[openapi]
#[get("/challenges/<id>")]
pub async fn get_challenge(
    id: ChallengeId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<ChallengeView>, ApiError> {
    let gs = game_state.lock().await;
    let view = gs.challenge(id, Utc::now())?;
    Ok(Json(view))
}

#[openapi]
#[post("/challenges/<id>/accept", format = "json", data = "<counter>")]
pub async fn accept_challenge(
    id: ChallengeId,
    counter: Json<CounterStake>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<ChallengeView>, ApiError> {
    let mut gs = game_state.lock().await;
    let view = gs.accept_challenge(id, counter.0, Utc::now())?;
    Ok(Json(view))
}

#[openapi]
#[post("/challenges/<id>/decline", format = "json", data = "<request>")]
pub async fn decline_challenge(
    id: ChallengeId,
    request: Json<DeclineRequest>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<ChallengeView>, ApiError> {
    let mut gs = game_state.lock().await;
    let view = gs.decline_challenge(id, request.user_id, Utc::now())?;
    Ok(Json(view))
}
