use crate::commands::make_client;
use crate::error::Result;

pub fn run() -> Result<()> {
    let client = make_client()?;
    client.clear_cache();
    println!("Cache cleared");
    Ok(())
}
