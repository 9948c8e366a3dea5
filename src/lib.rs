//! # Motor Duel
//!
//! A web API for a vehicle card-battle and tuning-progression game.
//!
//! ## Overview
//!
//! Players enroll owned vehicle cards into the tuning mini-game, buy staged
//! mod upgrades with XP, deal random hands, assign cards onto the three
//! battle slots (power, torque, speed) and resolve 1v1 challenges in either
//! best-of-3 slot mode or single-card weighted-aggregate mode.
//!
//! ## Architecture
//!
//! The API is built using the Rocket web framework with OpenAPI documentation
//! support. Game state is managed through a thread-safe `Arc<Mutex<T>>`
//! wrapper to allow concurrent access from multiple HTTP requests; every
//! state transition runs as one short unit of work under that lock.

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub mod challenges;
pub mod config;
pub mod engine;
pub mod garage;
pub mod players;
pub mod status_messages;

/// Initializes and configures the Rocket web server with all routes and OpenAPI documentation.
///
/// # Returns
///
/// A configured Rocket instance ready to be launched.
///
/// # Example
///
/// ```no_run
/// use motor_duel::rocket_initialize;
///
/// #[rocket::main]
/// async fn main() {
///     rocket_initialize().launch().await.expect("Failed to launch rocket");
/// }
/// ```
pub fn rocket_initialize() -> rocket::Rocket<rocket::Build> {
    use crate::challenges::okapi_add_operation_for_accept_challenge_;
    use crate::challenges::okapi_add_operation_for_create_challenge_;
    use crate::challenges::okapi_add_operation_for_deal_hand_;
    use crate::challenges::okapi_add_operation_for_decline_challenge_;
    use crate::challenges::okapi_add_operation_for_get_challenge_;
    use crate::challenges::okapi_add_operation_for_get_dealt_hand_;
    use crate::challenges::okapi_add_operation_for_list_challenges_;
    use crate::challenges::{
        accept_challenge, create_challenge, deal_hand, decline_challenge, get_challenge,
        get_dealt_hand, list_challenges,
    };
    use crate::garage::okapi_add_operation_for_add_tuned_car_;
    use crate::garage::okapi_add_operation_for_delete_tuned_car_;
    use crate::garage::okapi_add_operation_for_get_tuned_car_;
    use crate::garage::okapi_add_operation_for_list_tuned_cars_;
    use crate::garage::okapi_add_operation_for_upgrade_tuned_car_;
    use crate::garage::{
        add_tuned_car, delete_tuned_car, get_tuned_car, list_tuned_cars, upgrade_tuned_car,
    };
    use crate::players::okapi_add_operation_for_add_test_card_;
    use crate::players::okapi_add_operation_for_add_test_player_;
    use crate::players::okapi_add_operation_for_get_balance_;
    use crate::players::okapi_add_operation_for_get_player_;
    use crate::players::okapi_add_operation_for_list_events_;
    use crate::players::okapi_add_operation_for_list_player_cards_;
    use crate::players::okapi_add_operation_for_set_seed_;
    use crate::players::{
        add_test_card, add_test_player, get_balance, get_player, list_events, list_player_cards,
        set_seed,
    };

    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    let gs = std::sync::Arc::new(rocket::futures::lock::Mutex::new(engine::GameState::new()));

    rocket::build()
        .mount(
            "/",
            openapi_get_routes![
                add_tuned_car,
                list_tuned_cars,
                get_tuned_car,
                delete_tuned_car,
                upgrade_tuned_car,
                deal_hand,
                get_dealt_hand,
                create_challenge,
                list_challenges,
                get_challenge,
                accept_challenge,
                decline_challenge,
                add_test_player,
                add_test_card,
                set_seed,
                get_player,
                get_balance,
                list_player_cards,
                list_events
            ],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
        .manage(gs)
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}
