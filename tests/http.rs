use minefield_server::build_rocket;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::{Client, LocalResponse};
use serde_json::Value;

fn client() -> Client {
    Client::tracked(build_rocket()).expect("valid rocket instance")
}

fn json_body(response: LocalResponse<'_>) -> Value {
    let body = response.into_string().expect("response body");
    serde_json::from_str(&body).expect("json body")
}

fn create(client: &Client, body: &str) -> Value {
    let response = client
        .post("/games/")
        .header(ContentType::Form)
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    json_body(response)
}

fn act(client: &Client, uuid: &str, body: &str) -> Value {
    let response = client
        .post(format!("/games/{uuid}"))
        .header(ContentType::Form)
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    json_body(response)
}

#[test]
fn create_returns_uuid() {
    let client = client();
    let body = create(&client, "w=9&h=9&m=10");

    assert!(body.get("error").is_none());
    let uuid = body["uuid"].as_str().expect("uuid string");
    assert!(!uuid.is_empty());
}

#[test]
fn create_rejects_invalid_dimensions() {
    let client = client();

    for body in ["w=9&h=9&m=81", "w=0&h=9&m=5", "w=9&h=-1&m=5", "w=3&h=3&m=-1"] {
        let response = create(&client, body);
        assert_eq!(response["error"], "invalid board dimensions");
        assert!(response.get("uuid").is_none());
    }
}

#[test]
fn revealing_mine_free_board_wins_immediately() {
    let client = client();
    let uuid = create(&client, "w=3&h=3&m=0")["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let state = act(&client, &uuid, "x=0&y=0");

    assert_eq!(state["flags"], 0);
    assert_eq!(state["won"], true);
    assert!(state["ended_at"].as_u64().is_some());

    let grid = state["grid"].as_array().unwrap();
    assert_eq!(grid.len(), 9);
    assert!(grid.iter().all(|tile| tile == ""));
    assert_eq!(state["tiles"], state["grid"]);
}

#[test]
fn flag_toggle_over_http() {
    let client = client();
    let uuid = create(&client, "w=3&h=3&m=1")["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let state = act(&client, &uuid, "x=1&y=1&flag=1");
    assert_eq!(state["flags"], 1);
    assert_eq!(state["grid"][4], "!");
    assert!(state.get("ended_at").is_none());
    assert!(state.get("won").is_none());

    let state = act(&client, &uuid, "x=1&y=1&flag=1");
    assert_eq!(state["flags"], 0);
    assert_eq!(state["grid"][4], "?");
}

#[test]
fn action_on_unknown_game_is_an_error() {
    let client = client();
    let state = act(&client, "definitely-not-a-game", "x=0&y=0");
    assert_eq!(state["error"], "no such game");
}

#[test]
fn out_of_bounds_action_is_an_error() {
    let client = client();
    let uuid = create(&client, "w=3&h=3&m=1")["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    for body in ["x=5&y=0", "x=0&y=3", "x=-1&y=0"] {
        let state = act(&client, &uuid, body);
        assert_eq!(state["error"], "coordinates outside the board");
    }
}

#[test]
fn action_after_terminal_state_is_rejected() {
    let client = client();
    let uuid = create(&client, "w=2&h=2&m=0")["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let state = act(&client, &uuid, "x=0&y=0");
    assert_eq!(state["won"], true);

    let state = act(&client, &uuid, "x=1&y=1");
    assert_eq!(state["error"], "game already ended");
}

#[test]
fn delete_is_idempotent() {
    let client = client();
    let uuid = create(&client, "w=3&h=3&m=1")["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let response = client.delete(format!("/games/{uuid}")).dispatch();
    assert_eq!(response.status(), Status::NoContent);

    // Deleting again, or deleting an id that never existed, still succeeds.
    let response = client.delete(format!("/games/{uuid}")).dispatch();
    assert_eq!(response.status(), Status::NoContent);
    let response = client.delete("/games/never-created").dispatch();
    assert_eq!(response.status(), Status::NoContent);

    let state = act(&client, &uuid, "x=0&y=0");
    assert_eq!(state["error"], "no such game");
}

#[test]
fn flag_zero_counts_as_reveal() {
    let client = client();
    let uuid = create(&client, "w=2&h=2&m=0")["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let state = act(&client, &uuid, "x=0&y=0&flag=0");
    assert_eq!(state["won"], true);
}
