//! Tuning endpoints: enroll cards, buy stages, tear down and refund.

use chrono::Utc;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use crate::engine::error::EngineError;
use crate::engine::types::{CardId, ModKind, TunedCar, TunedCarId, UserId};
use crate::status_messages::ApiError;

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct EnrollRequest {
    pub user_id: UserId,
    pub card_id: CardId,
}

/// What a removal hands back to the caller.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct RemovalReceipt {
    pub tuned_car_id: TunedCarId,
    pub refunded_xp: u32,
}

#[openapi]
#[post("/tuned-cars", format = "json", data = "<request>")]
pub async fn add_tuned_car(
    request: Json<EnrollRequest>,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Created<Json<TunedCar>>, ApiError> {
    let mut gs = game_state.lock().await;
    let car = gs.enroll_tuned_car(request.user_id, request.card_id, Utc::now())?;
    Ok(Created::new(format!("/tuned-cars/{}", car.id)).body(Json(car)))
}

#[openapi]
#[get("/tuned-cars?<user_id>")]
pub async fn list_tuned_cars(
    user_id: UserId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Json<Vec<TunedCar>> {
    let gs = game_state.lock().await;
    Json(gs.tuned_cars_of(user_id))
}

#[openapi]
#[get("/tuned-cars/<id>")]
pub async fn get_tuned_car(
    id: TunedCarId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<TunedCar>, ApiError> {
    let gs = game_state.lock().await;
    let car = gs.tuned_car(id)?.clone();
    Ok(Json(car))
}

#[openapi]
#[delete("/tuned-cars/<id>")]
pub async fn delete_tuned_car(
    id: TunedCarId,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<RemovalReceipt>, ApiError> {
    let mut gs = game_state.lock().await;
    let refunded_xp = gs.remove_tuned_car(id, Utc::now())?;
    Ok(Json(RemovalReceipt {
        tuned_car_id: id,
        refunded_xp,
    }))
}

#[openapi]
#[post("/tuned-cars/<id>/upgrades/<mod_slug>")]
pub async fn upgrade_tuned_car(
    id: TunedCarId,
    mod_slug: String,
    game_state: &State<std::sync::Arc<rocket::futures::lock::Mutex<crate::engine::GameState>>>,
) -> Result<Json<TunedCar>, ApiError> {
    let kind = ModKind::parse_slug(&mod_slug)
        .ok_or_else(|| ApiError::from(EngineError::NotFound(format!("mod {mod_slug}"))))?;
    let mut gs = game_state.lock().await;
    let car = gs.upgrade_mod(id, kind, Utc::now())?;
    Ok(Json(car))
}
