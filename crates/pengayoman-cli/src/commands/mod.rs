pub mod ads;
pub mod config;
pub mod consent;
pub mod prayers;
pub mod reward;

use pengayoman_core::{AppContext, Config};

/// Open persisted state with consent and reward loaded.
pub(crate) fn context() -> AppContext {
    let ctx = AppContext::open(Config::load_or_default());
    ctx.initialize();
    ctx
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
