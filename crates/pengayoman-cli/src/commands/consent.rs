use clap::Subcommand;

use super::{context, print_json};

#[derive(Subcommand)]
pub enum ConsentAction {
    /// Show the current consent record
    Status,
    /// Record consent for personalized ads
    Grant,
    /// Withdraw consent; non-personalized ads stay allowed
    Revoke,
    /// Forget the stored consent
    Reset,
}

pub fn run(action: ConsentAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = context();
    let consent = ctx.consent();

    match action {
        ConsentAction::Status => {}
        ConsentAction::Grant => consent.grant_consent(),
        ConsentAction::Revoke => consent.revoke_consent(),
        ConsentAction::Reset => {
            consent.reset_consent();
            println!("null");
            return Ok(());
        }
    }
    print_json(&consent.consent_info())
}
