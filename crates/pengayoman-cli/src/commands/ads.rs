use clap::Subcommand;
use serde_json::json;

use super::{context, print_json};

#[derive(Subcommand)]
pub enum AdsAction {
    /// Show what an ad request would look like right now
    Status,
}

pub fn run(action: AdsAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = context();

    match action {
        AdsAction::Status => print_json(&json!({
            "can_request_ads": ctx.consent().can_request_ads(),
            "request_configuration": ctx.consent().request_configuration(),
            "unit_ids": ctx.unit_ids(),
            "test_mode": ctx.config().ads.test_mode,
            "show_banner": ctx.should_show_banner(),
        })),
    }
}
