#[tokio::main]
async fn main() {
    vote::start_server().await;
}
