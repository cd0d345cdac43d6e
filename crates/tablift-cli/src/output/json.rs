use serde::Serialize;
use tablift_core::TabliftError;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), TabliftError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
