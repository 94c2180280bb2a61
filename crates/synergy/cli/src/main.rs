//! Synergy CLI entry point

fn main() -> anyhow::Result<()> {
    synergy_cli::run()?;
    Ok(())
}
