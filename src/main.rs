use rocket::{Build, Rocket};
use tracing::info;

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("Starting minefield server");

    minefield_server::build_rocket()
}
