//! Extended M3U line rendering.

use crate::catalog::ChannelNumber;

/// `#EXTM3U` header pointing players at the guide data.
pub fn format_header(epg_url: &str) -> String {
    format!("#EXTM3U url-tvg=\"{epg_url}\"\n")
}

/// Render the `#EXTINF` metadata line for one channel.
///
/// Attribute values are quoted, so `"` in the name and group is swapped for
/// `'`. The display name follows the last comma of the line and has its own
/// commas removed.
pub fn format_entry(
    channel_id: &str,
    tvg_id: &str,
    channel_number: Option<&ChannelNumber>,
    tvg_name: &str,
    logo_url: &str,
    group_title: &str,
    display_name: &str,
) -> String {
    let chno = channel_number
        .and_then(ChannelNumber::digits)
        .unwrap_or_default();

    let tvg_name = tvg_name.replace('"', "'");
    let group_title = group_title.replace('"', "'");
    let display_name = display_name.replace(',', "");

    format!(
        "#EXTINF:-1 channel-id=\"{channel_id}\" tvg-id=\"{tvg_id}\" tvg-chno=\"{chno}\" \
         tvg-name=\"{tvg_name}\" tvg-logo=\"{logo_url}\" group-title=\"{group_title}\",{display_name}\n"
    )
}
