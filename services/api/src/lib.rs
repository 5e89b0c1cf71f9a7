mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use fuel_services::error::AppError;

pub use infra::InMemoryVerificationRepository;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
