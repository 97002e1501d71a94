//! Station loader: fetch one page, geocode each item in turn, drop misses.
//!
//! Flow:  Loading → fetch → Converting → sequential geocoding → Loaded(n)
//!                       ↘ Failed(reason)

use super::types::{RawStation, StationRecord, StationSource};
use crate::geocode::{AddressLookup, Geocoder};
use serde::Serialize;
use std::fmt;
use tracing::{info, instrument, warn};

/// Progress of the one-shot load, shown to the user as a status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum LoadStatus {
    Idle,
    Loading,
    Converting,
    Loaded(usize),
    Failed(String),
}

impl LoadStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Loaded(_) | Self::Failed(_))
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Preparing data load..."),
            Self::Loading => write!(f, "\u{1F4CD} Loading KEPCO station data..."),
            Self::Converting => write!(f, "\u{1F69A} Converting coordinates..."),
            Self::Loaded(n) => write!(f, "\u{2705} Load complete ({} stations shown)", n),
            Self::Failed(reason) => write!(f, "\u{274C} Server connection failed: {}", reason),
        }
    }
}

/// Result of one full load, delivered as a single update.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub stations: Vec<StationRecord>,
    pub status: LoadStatus,
    /// Items dropped because no coordinate could be found.
    pub skipped: usize,
}

// ─── Sequential enrichment ──────────────────────────────────────

/// Per-item result of geocoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Enriched {
    Resolved(StationRecord),
    Skipped(RawStation),
}

/// Iterator adapter: one geocoding chain per `next()`, never more than one in flight.
pub struct Enrich<'g, I, L> {
    items: I,
    geocoder: &'g Geocoder<L>,
}

impl<I, L> Iterator for Enrich<'_, I, L>
where
    I: Iterator<Item = RawStation>,
    L: AddressLookup,
{
    type Item = Enriched;

    fn next(&mut self) -> Option<Enriched> {
        let raw = self.items.next()?;
        Some(match self.geocoder.locate_raw(&raw.stn_addr) {
            Some(coord) => Enriched::Resolved(StationRecord::located(raw, coord)),
            None => Enriched::Skipped(raw),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

pub fn enrich<I, L>(items: I, geocoder: &Geocoder<L>) -> Enrich<'_, I::IntoIter, L>
where
    I: IntoIterator<Item = RawStation>,
    L: AddressLookup,
{
    Enrich {
        items: items.into_iter(),
        geocoder,
    }
}

// ─── Loader ─────────────────────────────────────────────────────

pub struct StationLoader<S, L> {
    source: S,
    geocoder: Geocoder<L>,
}

impl<S: StationSource, L: AddressLookup> StationLoader<S, L> {
    pub fn new(source: S, geocoder: Geocoder<L>) -> Self {
        Self { source, geocoder }
    }

    /// Run the whole load. Intermediate statuses go to `on_status`; the final
    /// status travels in the outcome together with the stations.
    #[instrument(level = "info", skip_all)]
    pub fn load(&self, mut on_status: impl FnMut(&LoadStatus)) -> LoadOutcome {
        on_status(&LoadStatus::Loading);

        let items = match self.source.fetch() {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "station list fetch failed");
                return LoadOutcome {
                    stations: Vec::new(),
                    status: LoadStatus::Failed(e.to_string()),
                    skipped: 0,
                };
            }
        };

        info!(count = items.len(), "station list fetched");
        on_status(&LoadStatus::Converting);

        let mut stations = Vec::with_capacity(items.len());
        let mut skipped = 0;
        for item in enrich(items, &self.geocoder) {
            match item {
                Enriched::Resolved(record) => stations.push(record),
                Enriched::Skipped(raw) => {
                    skipped += 1;
                    info!(place = %raw.stn_place, address = %raw.stn_addr, "no coordinates, skipping");
                }
            }
        }

        info!(resolved = stations.len(), skipped, "coordinate conversion finished");
        LoadOutcome {
            status: LoadStatus::Loaded(stations.len()),
            stations,
            skipped,
        }
    }
}
