mod auth;
mod constants;
mod error;
mod handlers;
mod macros;
mod server;
mod sweep;
mod tasks;
mod utils;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    if let Err(err) = server::run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
