use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    bookstore_server::run().await
}
