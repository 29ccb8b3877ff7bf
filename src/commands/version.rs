use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("pcdiag version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
