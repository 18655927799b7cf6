#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quizgate::run().await {
        eprintln!("quizgate fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
