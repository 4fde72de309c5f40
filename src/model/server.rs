use serde::Serialize;

use super::TileView;

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub uuid: String,
}

/// Snapshot returned after every action. `tiles` and `grid` carry the same
/// row-major board; the observed client reads `grid`, so both are sent.
/// `ended_at` appears once the game is over and `won` tells the two
/// terminal states apart.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub flags: usize,
    pub tiles: Vec<TileView>,
    pub grid: Vec<TileView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub won: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
