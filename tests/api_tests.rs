// HTTP-level tests against the assembled Rocket instance.
use motor_duel::rocket_initialize;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::Value;

fn client() -> Client {
    Client::tracked(rocket_initialize()).expect("valid rocket instance")
}

fn create_player(client: &Client, name: &str, earned_xp: u32) -> u64 {
    let response = client
        .post("/tests/players")
        .header(ContentType::JSON)
        .body(format!(r#"{{ "name": "{name}", "earned_xp": {earned_xp} }}"#))
        .dispatch();
    assert_eq!(response.status(), Status::Created);
    response
        .headers()
        .get_one("location")
        .expect("Missing location header")
        .trim_start_matches("/players/")
        .parse()
        .expect("Invalid player ID")
}

fn create_vehicle(client: &Client, owner: u64, power: u32, torque: u32, top_speed: u32) -> u64 {
    let body = format!(
        r#"{{ "owner_id": {owner}, "name": "car", "kind": "vehicle", "power": {power}, "torque": {torque}, "top_speed": {top_speed}, "rarity": "common" }}"#
    );
    let response = client
        .post("/tests/cards")
        .header(ContentType::JSON)
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::Created);
    response
        .headers()
        .get_one("location")
        .expect("Missing location header")
        .trim_start_matches("/cards/")
        .parse()
        .expect("Invalid card ID")
}

#[test]
fn dealt_hands_are_committed_and_rereadable() {
    let client = client();
    let player = create_player(&client, "ann", 0);
    for _ in 0..5 {
        create_vehicle(&client, player, 100, 100, 100);
    }
    client
        .post("/player/seed")
        .header(ContentType::JSON)
        .body(r#"{ "seed": 42 }"#)
        .dispatch();

    let dealt = client
        .post(format!("/players/{player}/deal"))
        .dispatch()
        .into_json::<Value>()
        .expect("json hand");
    let read_once = client
        .get(format!("/players/{player}/deal"))
        .dispatch()
        .into_json::<Value>()
        .expect("json hand");
    let read_twice = client
        .get(format!("/players/{player}/deal"))
        .dispatch()
        .into_json::<Value>()
        .expect("json hand");
    assert_eq!(dealt["card_ids"], read_once["card_ids"]);
    assert_eq!(read_once, read_twice);
}

#[test]
fn deal_without_enough_vehicles_is_rejected() {
    let client = client();
    let player = create_player(&client, "ann", 0);
    create_vehicle(&client, player, 1, 1, 1);
    let response = client.post(format!("/players/{player}/deal")).dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_json::<Value>().expect("error body");
    assert_eq!(body["code"], "INSUFFICIENT_CARDS");
}

#[test]
fn best_of_three_flow_end_to_end() {
    let client = client();
    let ann = create_player(&client, "ann", 0);
    let ben = create_player(&client, "ben", 0);
    // Three vehicles each, so the dealt hand is the whole collection.
    let a1 = create_vehicle(&client, ann, 300, 380, 250);
    let a2 = create_vehicle(&client, ann, 280, 400, 260);
    let a3 = create_vehicle(&client, ann, 310, 390, 255);
    let b1 = create_vehicle(&client, ben, 290, 350, 240);
    let b2 = create_vehicle(&client, ben, 260, 410, 250);
    let b3 = create_vehicle(&client, ben, 300, 370, 270);

    assert_eq!(
        client.post(format!("/players/{ann}/deal")).dispatch().status(),
        Status::Ok
    );
    assert_eq!(
        client.post(format!("/players/{ben}/deal")).dispatch().status(),
        Status::Ok
    );

    let draft = format!(
        r#"{{ "challenger_id": {ann}, "opponent_id": {ben}, "reward": "xp",
             "stake": {{ "mode": "BestOfThree", "assignment": {{ "power": {a1}, "torque": {a2}, "speed": {a3} }} }} }}"#
    );
    let created = client
        .post("/challenges")
        .header(ContentType::JSON)
        .body(draft)
        .dispatch();
    assert_eq!(created.status(), Status::Created);
    let challenge = created.into_json::<Value>().expect("challenge view");
    assert_eq!(challenge["status"], "pending");
    let id = challenge["id"].as_u64().expect("challenge id");

    let counter = format!(
        r#"{{ "user_id": {ben}, "assignment": {{ "power": {b1}, "torque": {b2}, "speed": {b3} }} }}"#
    );
    let accepted = client
        .post(format!("/challenges/{id}/accept"))
        .header(ContentType::JSON)
        .body(counter.clone())
        .dispatch();
    assert_eq!(accepted.status(), Status::Ok);
    let view = accepted.into_json::<Value>().expect("challenge view");
    assert_eq!(view["status"], "completed");
    assert_eq!(view["outcome"]["winner_id"].as_u64(), Some(ben));
    assert_eq!(view["outcome"]["detail"]["kind"], "Rounds");

    // 30 to the winner, 20 consolation to the loser.
    let winner = client
        .get(format!("/players/{ben}"))
        .dispatch()
        .into_json::<Value>()
        .expect("player view");
    let loser = client
        .get(format!("/players/{ann}"))
        .dispatch()
        .into_json::<Value>()
        .expect("player view");
    assert_eq!(winner["earned_xp"], 30);
    assert_eq!(loser["earned_xp"], 20);

    // The losing side cannot resolve the same challenge again.
    let again = client
        .post(format!("/challenges/{id}/accept"))
        .header(ContentType::JSON)
        .body(counter)
        .dispatch();
    assert_eq!(again.status(), Status::Conflict);
}

#[test]
fn tuning_flow_end_to_end() {
    let client = client();
    let ann = create_player(&client, "ann", 1000);
    let car = create_vehicle(&client, ann, 300, 300, 300);

    let enrolled = client
        .post("/tuned-cars")
        .header(ContentType::JSON)
        .body(format!(r#"{{ "user_id": {ann}, "card_id": {car} }}"#))
        .dispatch();
    assert_eq!(enrolled.status(), Status::Created);
    let tuned = enrolled.into_json::<Value>().expect("tuned car");
    let tuned_id = tuned["id"].as_u64().expect("tuned car id");

    // Engine stages cost 60 + 120 + 240 with the default tables.
    for stage in 1..=3u64 {
        let response = client
            .post(format!("/tuned-cars/{tuned_id}/upgrades/engine"))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        let car = response.into_json::<Value>().expect("tuned car");
        assert_eq!(car["stages"]["engine"].as_u64(), Some(stage));
    }
    let maxed = client
        .post(format!("/tuned-cars/{tuned_id}/upgrades/engine"))
        .dispatch();
    assert_eq!(maxed.status(), Status::BadRequest);
    assert_eq!(
        maxed.into_json::<Value>().expect("error body")["code"],
        "MAX_STAGE_REACHED"
    );

    let balance = client
        .get(format!("/players/{ann}/balance"))
        .dispatch()
        .into_json::<Value>()
        .expect("balance view");
    assert_eq!(balance["earned_xp"], 1000);
    assert_eq!(balance["invested_xp"], 420);
    assert_eq!(balance["available_xp"], 580);

    let removed = client
        .delete(format!("/tuned-cars/{tuned_id}"))
        .dispatch()
        .into_json::<Value>()
        .expect("receipt");
    assert_eq!(removed["refunded_xp"], 420);
    let player = client
        .get(format!("/players/{ann}"))
        .dispatch()
        .into_json::<Value>()
        .expect("player view");
    assert_eq!(player["available_xp"], 1000);
}

#[test]
fn upgrade_without_balance_is_a_conflict() {
    let client = client();
    let ann = create_player(&client, "ann", 30);
    let car = create_vehicle(&client, ann, 1, 1, 1);
    let tuned = client
        .post("/tuned-cars")
        .header(ContentType::JSON)
        .body(format!(r#"{{ "user_id": {ann}, "card_id": {car} }}"#))
        .dispatch()
        .into_json::<Value>()
        .expect("tuned car");
    let tuned_id = tuned["id"].as_u64().expect("tuned car id");

    let response = client
        .post(format!("/tuned-cars/{tuned_id}/upgrades/engine"))
        .dispatch();
    assert_eq!(response.status(), Status::Conflict);
    assert_eq!(
        response.into_json::<Value>().expect("error body")["code"],
        "INSUFFICIENT_XP"
    );
}

#[test]
fn challenge_creation_is_rate_limited() {
    let client = client();
    let ann = create_player(&client, "ann", 0);
    let car = create_vehicle(&client, ann, 100, 100, 100);
    let draft = format!(
        r#"{{ "challenger_id": {ann}, "reward": "xp",
             "stake": {{ "mode": "Aggregate", "category": "power", "card_id": {car} }} }}"#
    );
    for _ in 0..3 {
        let response = client
            .post("/challenges")
            .header(ContentType::JSON)
            .body(draft.clone())
            .dispatch();
        assert_eq!(response.status(), Status::Created);
    }
    let capped = client
        .post("/challenges")
        .header(ContentType::JSON)
        .body(draft)
        .dispatch();
    assert_eq!(capped.status(), Status::TooManyRequests);
}

#[test]
fn decline_by_a_stranger_is_forbidden() {
    let client = client();
    let ann = create_player(&client, "ann", 0);
    let ben = create_player(&client, "ben", 0);
    let eve = create_player(&client, "eve", 0);
    let car = create_vehicle(&client, ann, 100, 100, 100);

    let created = client
        .post("/challenges")
        .header(ContentType::JSON)
        .body(format!(
            r#"{{ "challenger_id": {ann}, "opponent_id": {ben}, "reward": "xp",
                 "stake": {{ "mode": "Aggregate", "category": "total", "card_id": {car} }} }}"#
        ))
        .dispatch()
        .into_json::<Value>()
        .expect("challenge view");
    let id = created["id"].as_u64().expect("challenge id");

    let response = client
        .post(format!("/challenges/{id}/decline"))
        .header(ContentType::JSON)
        .body(format!(r#"{{ "user_id": {eve} }}"#))
        .dispatch();
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .post(format!("/challenges/{id}/decline"))
        .header(ContentType::JSON)
        .body(format!(r#"{{ "user_id": {ben} }}"#))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.into_json::<Value>().expect("challenge view")["status"],
        "declined"
    );
}

#[test]
fn missing_rows_map_to_not_found() {
    let client = client();
    assert_eq!(
        client.get("/challenges/999").dispatch().status(),
        Status::NotFound
    );
    assert_eq!(
        client.get("/tuned-cars/999").dispatch().status(),
        Status::NotFound
    );
    assert_eq!(
        client.get("/players/999").dispatch().status(),
        Status::NotFound
    );
}

#[test]
fn engine_events_are_exposed_in_order() {
    let client = client();
    let ann = create_player(&client, "ann", 0);
    for _ in 0..3 {
        create_vehicle(&client, ann, 10, 10, 10);
    }
    client.post(format!("/players/{ann}/deal")).dispatch();

    let log = client
        .get("/events")
        .dispatch()
        .into_json::<Value>()
        .expect("event log");
    let entries = log["entries"].as_array().expect("entries array");
    assert!(!entries.is_empty());
    let seqs: Vec<u64> = entries
        .iter()
        .map(|e| e["seq"].as_u64().expect("seq"))
        .collect();
    let mut sorted = seqs.clone();
    sorted.sort_unstable();
    assert_eq!(seqs, sorted);
    assert!(entries
        .iter()
        .any(|e| e["payload"]["type"] == "CardsDealt"));
}
