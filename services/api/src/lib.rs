mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use stem_enroll::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
