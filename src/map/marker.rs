//! Point markers and their popups.

use crate::geocode::Coordinate;
use crate::station::StationRecord;
use serde::Serialize;

/// Marker icon descriptor, handed to the front-end as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    pub icon_url: &'static str,
    pub shadow_url: &'static str,
    pub icon_size: [u32; 2],
    pub icon_anchor: [u32; 2],
}

pub const RED_ICON: Icon = Icon {
    icon_url: "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-red.png",
    shadow_url: "https://cdnjs.cloudflare.com/ajax/libs/leaflet/0.7.7/images/marker-shadow.png",
    icon_size: [25, 41],
    icon_anchor: [12, 41],
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub icon: Icon,
    pub popup_html: String,
}

impl Marker {
    /// A red station marker, or `None` when the record lacks either coordinate.
    pub fn for_station(station: &StationRecord) -> Option<Self> {
        let position = station.coordinate()?;
        Some(Self {
            position,
            icon: RED_ICON,
            popup_html: station_popup(station),
        })
    }
}

pub fn station_popup(station: &StationRecord) -> String {
    format!(
        concat!(
            r#"<div style="padding: 5px; min-width: 150px;">"#,
            r#"<strong style="color: #e11d48;">{}</strong><br/>"#,
            r#"<small>{}</small><br/>"#,
            r#"<div style="margin-top: 5px; font-size: 11px;">급속: {} | 완속: {}</div>"#,
            r#"</div>"#,
        ),
        escape_html(&station.place),
        escape_html(&station.address),
        station.rapid_count,
        station.slow_count,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
