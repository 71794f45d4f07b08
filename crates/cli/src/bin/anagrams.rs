use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    anagram_cli::main_entry().await
}
