#[tokio::main]
async fn main() -> std::io::Result<()> {
    drone_sim::run_with_config().await
}
