use clap::Subcommand;
use pengayoman_core::RewardTracker;
use serde_json::json;

use super::{context, print_json};

#[derive(Subcommand)]
pub enum RewardAction {
    /// Show the ad-free window
    Status,
    /// Start a new ad-free window, as after a rewarded ad
    Grant,
    /// End the ad-free window
    Clear,
}

pub fn run(action: RewardAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = context();
    let reward = ctx.reward();

    match action {
        RewardAction::Status => {}
        RewardAction::Grant => reward.grant_reward(),
        RewardAction::Clear => reward.clear(),
    }
    print_json(&status(reward))
}

fn status(reward: &RewardTracker) -> serde_json::Value {
    json!({
        "ad_free": reward.is_ad_free(),
        "expires_at_ms": reward.expires_at_ms(),
        "remaining": reward.time_remaining_formatted(),
    })
}
