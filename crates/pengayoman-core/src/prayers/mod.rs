//! Prayer list and detail data.
//!
//! Rows come from a remote tabular API whose column names are the
//! user-facing Indonesian labels. Anything unusable is dropped during
//! mapping, and network failures fall back to a small built-in list.

mod client;

pub use client::PrayerClient;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Name the data source uses for rows nobody has filled in.
pub const UNKNOWN_PRAYER_NAME: &str = "Doa tidak diketahui";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prayer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arabic: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub is_favorite: bool,
}

/// One row of the remote table.
#[derive(Debug, Clone, Deserialize)]
pub struct PrayerRow {
    pub id: u64,
    #[serde(rename = "Nama Doa", default)]
    pub name: Option<String>,
    #[serde(rename = "Lafadz Doa", default)]
    pub arabic: Option<String>,
    #[serde(rename = "Arti Doa", default)]
    pub meaning: Option<String>,
}

/// Response body of the rows endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PrayerPage {
    #[serde(default)]
    pub results: Vec<PrayerRow>,
}

impl PrayerRow {
    /// `None` for rows without a usable name.
    pub fn into_prayer(self) -> Option<Prayer> {
        let name = self.name.filter(|n| !n.is_empty() && n != UNKNOWN_PRAYER_NAME)?;
        Some(Prayer {
            id: self.id.to_string(),
            name,
            arabic: self.arabic.unwrap_or_default(),
            meaning: self.meaning.unwrap_or_default(),
            is_favorite: false,
        })
    }
}

pub fn map_rows(rows: Vec<PrayerRow>) -> Vec<Prayer> {
    rows.into_iter().filter_map(PrayerRow::into_prayer).collect()
}

/// Shown when the remote list cannot be fetched.
pub fn fallback_prayers() -> Vec<Prayer> {
    [
        ("1", "Doa Sebelum Makan"),
        ("2", "Doa Sesudah Makan"),
        ("3", "Doa Sebelum Tidur"),
    ]
    .into_iter()
    .map(|(id, name)| Prayer {
        id: id.to_string(),
        name: name.to_string(),
        arabic: String::new(),
        meaning: String::new(),
        is_favorite: false,
    })
    .collect()
}

/// In-memory prayer list with favorites.
#[derive(Debug, Clone, Default)]
pub struct PrayerCatalog {
    prayers: Vec<Prayer>,
    favorites: BTreeSet<String>,
}

impl PrayerCatalog {
    pub fn new(prayers: Vec<Prayer>) -> Self {
        Self {
            prayers,
            favorites: BTreeSet::new(),
        }
    }

    /// Replace the list, keeping favorite marks for ids that still exist.
    pub fn replace(&mut self, prayers: Vec<Prayer>) {
        self.prayers = prayers;
        for prayer in &mut self.prayers {
            prayer.is_favorite = self.favorites.contains(&prayer.id);
        }
    }

    pub fn all(&self) -> &[Prayer] {
        &self.prayers
    }

    pub fn get(&self, id: &str) -> Option<&Prayer> {
        self.prayers.iter().find(|p| p.id == id)
    }

    /// Case-insensitive substring match on the name. An empty query matches
    /// everything.
    pub fn search(&self, query: &str) -> Vec<&Prayer> {
        let needle = query.to_lowercase();
        self.prayers
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Flip the favorite mark. Returns the new state, `None` for unknown ids.
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let prayer = self.prayers.iter_mut().find(|p| p.id == id)?;
        prayer.is_favorite = !prayer.is_favorite;
        if prayer.is_favorite {
            self.favorites.insert(id.to_string());
        } else {
            self.favorites.remove(id);
        }
        Some(prayer.is_favorite)
    }

    pub fn favorites(&self) -> Vec<&Prayer> {
        self.prayers.iter().filter(|p| p.is_favorite).collect()
    }
}
