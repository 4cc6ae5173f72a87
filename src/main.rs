use leaderboard_engine::api::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local development reads a .env file; deployed environments set variables directly
    dotenv::dotenv().ok();

    server::run_server().await
}
