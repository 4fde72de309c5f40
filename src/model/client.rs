use rocket::FromForm;

/// Body of `POST /games/`, url-encoded as `w=30&h=16&m=99`.
///
/// The fields are signed so a negative value reaches dimension validation
/// instead of failing form parsing with an opaque 422.
#[derive(Debug, FromForm)]
pub struct CreateParams {
    #[field(name = "w")]
    pub width: i64,
    #[field(name = "h")]
    pub height: i64,
    #[field(name = "m")]
    pub mines: i64,
}

/// Body of `POST /games/{uuid}`, url-encoded as `x=3&y=4` with an optional
/// `flag=1` to toggle a flag instead of revealing.
#[derive(Debug, FromForm)]
pub struct ActionParams {
    pub x: i64,
    pub y: i64,
    pub flag: Option<i64>,
}

impl ActionParams {
    pub fn is_flag(&self) -> bool {
        self.flag.is_some_and(|flag| flag != 0)
    }
}
