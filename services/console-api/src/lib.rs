mod browse;
mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use hireboard_console::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
