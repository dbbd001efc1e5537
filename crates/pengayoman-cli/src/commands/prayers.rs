use clap::Subcommand;
use pengayoman_core::PrayerCatalog;

use super::{context, print_json};

#[derive(Subcommand)]
pub enum PrayersAction {
    /// List prayers, falling back to the built-in set when offline
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one prayer by id
    Show {
        id: String,
    },
}

pub async fn run(action: PrayersAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = context();
    let catalog = PrayerCatalog::new(ctx.prayer_client().fetch_or_fallback().await);

    match action {
        PrayersAction::List { search } => {
            let prayers = match search.as_deref() {
                Some(query) => catalog.search(query),
                None => catalog.all().iter().collect(),
            };
            print_json(&prayers)?;
        }
        PrayersAction::Show { id } => match catalog.get(&id) {
            Some(prayer) => print_json(prayer)?,
            None => return Err(format!("prayer not found: {id}").into()),
        },
    }
    Ok(())
}
