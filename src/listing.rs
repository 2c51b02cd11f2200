// Plain-text rendering of a carpark list for the `list` command

use itertools::Itertools;

use crate::carpark::{CarparkRecord, display_or_na};
use crate::preferences::FavoriteSet;
use crate::view_model::SortKey;

const EMPTY_MESSAGE: &str = "No parking data available.";

/// Tab-separated table: favorite marker, park id, then the sortable columns.
pub fn render_table(records: &[&CarparkRecord], favorites: &FavoriteSet) -> String {
    if records.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let header = std::iter::once("★")
        .chain(std::iter::once("park_Id"))
        .chain(SortKey::ALL.iter().map(|k| k.key()))
        .join("\t");

    let rows = records.iter().map(|record| {
        let marker = if favorites.contains(&record.park_id) {
            "★"
        } else {
            " "
        };
        [
            marker,
            record.park_id.as_str(),
            display_or_na(&record.name),
            display_or_na(&record.display_address),
            display_or_na(&record.opening_status),
            record.vacancy.as_str(),
        ]
        .join("\t")
    });

    std::iter::once(header).chain(rows).join("\n")
}
