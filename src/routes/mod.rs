use std::sync::Arc;

use dashmap::Entry;
use rocket::{State, delete, form::Form, http::Status, post, serde::json::Json};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, GameError},
    logic::{Game, Sessions},
    model::{
        GameParams, Pos,
        client::{ActionParams, CreateParams},
        server::{CreateResponse, StateResponse},
    },
    rate_limit::{ClientIp, RateLimiter, check_rate_limit},
};

#[instrument(level = "trace", skip(sessions, game))]
fn add_session(sessions: &State<Sessions>, game: Game) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        match sessions.entry(id.clone()) {
            Entry::Occupied(_) => {
                debug!("Session id collision, trying another: {}", id);
                continue;
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(game)));
                info!("Created new game with id: {}", id);
                return id;
            }
        }
    }
}

fn game_params(params: &CreateParams) -> Result<GameParams, GameError> {
    if params.width <= 0 || params.height <= 0 || params.mines < 0 {
        return Err(GameError::InvalidDimensions);
    }
    Ok(GameParams {
        width: params.width as usize,
        height: params.height as usize,
        mines: params.mines as usize,
    })
}

#[post("/", data = "<params>")]
#[instrument(level = "trace", skip(params, sessions, rate_limiter, client_ip), fields(client_ip = %client_ip.0))]
pub fn create_game(
    params: Form<CreateParams>,
    sessions: &State<Sessions>,
    rate_limiter: &State<RateLimiter>,
    client_ip: ClientIp,
) -> Result<Json<CreateResponse>, ApiError> {
    info!(
        "Game creation request from {}: {}x{} with {} mines",
        client_ip.0, params.width, params.height, params.mines
    );

    check_rate_limit(rate_limiter, &client_ip)?;

    let game = Game::new(game_params(&params)?)?;
    let uuid = add_session(sessions, game);

    Ok(Json(CreateResponse { uuid }))
}

#[post("/<uuid>", data = "<params>")]
#[instrument(level = "trace", skip(params, sessions), fields(game_id = %uuid))]
pub async fn act(
    uuid: &str,
    params: Form<ActionParams>,
    sessions: &State<Sessions>,
) -> Result<Json<StateResponse>, ApiError> {
    let session = match sessions.get(uuid) {
        None => {
            warn!("Action for unknown game: {}", uuid);
            return Err(GameError::NotFound.into());
        }
        Some(entry) => entry.value().clone(),
    };

    if params.x < 0 || params.y < 0 {
        return Err(GameError::OutOfBounds.into());
    }
    let pos = Pos {
        x: params.x as usize,
        y: params.y as usize,
    };

    let mut game = session.lock().await;
    if params.is_flag() {
        game.flag(pos)?;
    } else {
        game.reveal(pos)?;
    }

    Ok(Json(game.state_response()))
}

// Best-effort by contract: the client clears its state no matter what we
// answer, so an unknown id is not an error.
#[delete("/<uuid>")]
#[instrument(level = "trace", skip(sessions), fields(game_id = %uuid))]
pub fn delete_game(uuid: &str, sessions: &State<Sessions>) -> Status {
    if sessions.remove(uuid).is_some() {
        info!("Deleted game: {}", uuid);
    } else {
        debug!("Delete for unknown game: {}", uuid);
    }
    Status::NoContent
}
