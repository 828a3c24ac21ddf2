//! The picker state machine.
//!
//! Synchronous and IO-free: intents that need a collaborator (reverse
//! geocode, forward search, device position) return a [`LookupTicket`], and
//! the shell feeds the eventual result back through the matching
//! `complete_*` method. Only the most recently issued ticket is honored, so
//! overlapping and out-of-order completions can never clobber newer state.
//! [`PickerDriver`](crate::PickerDriver) supplies the conventional async
//! wiring over this surface.

use geopick_core::{
    location_details, Coordinates, GeocodeError, GeocodeMatch, LocationDetails, PositionError,
    RawAddress, SavedLocation,
};
use geopick_store::{LocationStore, Storage};
use thiserror::Error;

/// Which screen of the picker flow is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Map,
    Confirm,
}

/// Zoom level applied whenever the picker recenters the map on a result.
pub const FOCUS_ZOOM: u8 = 15;

/// Label used when the device position is adopted. Device fixes skip the
/// reverse lookup, so this stands in for both the query text and the draft
/// address.
pub const MY_LOCATION_LABEL: &str = "My Location";

/// User-visible, recoverable flow notices. Every variant leaves the picker
/// open with its state intact.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickerError {
    /// Tried to continue from the map without choosing a point.
    #[error("select a point on the map first")]
    NothingSelected,

    /// Tried to save without a name or without a chosen point.
    #[error("enter a name and select a location on the map")]
    MissingNameOrLocation,

    /// A forward search matched nothing.
    #[error("address not found")]
    AddressNotFound,

    /// A forward search failed outright.
    #[error("address search failed")]
    SearchFailed,

    /// The device has a position capability but produced no fix.
    #[error("could not determine the device position")]
    PositionUnavailable,

    /// No position capability exists in this environment.
    #[error("device position is not supported here")]
    PositionUnsupported,
}

/// In-progress, unsaved candidate location. Exists only while the map or
/// confirm view is active and is never partially persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLocation {
    pub point: Coordinates,
    /// Human-readable address; empty until a lookup fills it in.
    pub address: String,
    pub details: LocationDetails,
}

/// Handle for one outstanding asynchronous lookup. A completion must
/// present the ticket it was issued with; tickets issued earlier than the
/// newest one are stale and their results are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    seq: u64,
    kind: LookupKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupKind {
    Reverse,
    Search,
    Position,
}

/// A forward search accepted for dispatch: the ticket plus the trimmed text
/// to send to the geocoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub ticket: LookupTicket,
    pub query: String,
}

/// Where the map should pan after a successful search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCamera {
    pub center: Coordinates,
    pub zoom: u8,
}

/// The picker's view flow and transient state over a [`LocationStore`].
pub struct PickerSession<S: Storage> {
    store: LocationStore<S>,
    view: View,
    query: String,
    draft: Option<DraftLocation>,
    map_home: Coordinates,
    next_seq: u64,
    pending: Option<LookupTicket>,
}

impl<S: Storage> PickerSession<S> {
    /// Opens a session over a loaded store. `map_home` is where the map
    /// looks before any point has been chosen.
    pub fn new(store: LocationStore<S>, map_home: Coordinates) -> Self {
        Self {
            store,
            view: View::List,
            query: String::new(),
            draft: None,
            map_home,
            next_seq: 0,
            pending: None,
        }
    }

    // ------------------------------------------------------------------
    // State inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    /// The shared text box: list filter, map search input, and the proposed
    /// name in the confirm view, depending on where the flow is.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn draft(&self) -> Option<&DraftLocation> {
        self.draft.as_ref()
    }

    /// All saved entries, in insertion order.
    #[must_use]
    pub fn locations(&self) -> &[SavedLocation] {
        self.store.list()
    }

    /// The current selection, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&SavedLocation> {
        self.store.current()
    }

    /// Where the map should look right now: the draft point once one
    /// exists, the configured home center before that.
    #[must_use]
    pub fn map_center(&self) -> Coordinates {
        self.draft.as_ref().map_or(self.map_home, |d| d.point)
    }

    /// Saved entries whose name or address contains the query text,
    /// case-insensitively. An empty query matches everything; no matches is
    /// an empty list, never an error.
    #[must_use]
    pub fn filtered_locations(&self) -> Vec<&SavedLocation> {
        let needle = self.query.trim().to_lowercase();
        self.store
            .list()
            .iter()
            .filter(|l| {
                needle.is_empty()
                    || l.name.to_lowercase().contains(&needle)
                    || l.address.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    // ------------------------------------------------------------------
    // List view
    // ------------------------------------------------------------------

    /// Switches to the map view to pick a new location. Whatever draft or
    /// outstanding lookup an earlier visit left behind is discarded.
    pub fn open_map(&mut self) {
        self.draft = None;
        self.pending = None;
        self.view = View::Map;
    }

    /// Adopts an already-saved entry as the selection, persisting the
    /// pointer, and returns the chosen record, the terminal outcome of the
    /// session. Membership of `location` in the saved list is not verified.
    pub fn select_saved(&mut self, location: &SavedLocation) -> SavedLocation {
        self.store.select(location);
        self.pending = None;
        location.clone()
    }

    /// Deletes a saved entry by id; unknown ids are a no-op. Accepted from
    /// any view, and the draft, if one exists, is untouched. Deleting the
    /// currently selected entry clears the selection.
    pub fn delete_saved(&mut self, id: &str) {
        self.store.delete(id);
    }

    // ------------------------------------------------------------------
    // Map view
    // ------------------------------------------------------------------

    /// Map click or marker drag-end at `point`. The draft coordinates
    /// update immediately (both the point and the numeric fields inside the
    /// details); textual fields keep their last-known values until the
    /// reverse lookup lands. Returns the ticket the completion must
    /// present, or `None` outside the map view.
    pub fn place_marker(&mut self, point: Coordinates) -> Option<LookupTicket> {
        if self.view != View::Map {
            return None;
        }

        match &mut self.draft {
            Some(draft) => {
                draft.point = point;
                draft.details.latitude = point.lat;
                draft.details.longitude = point.lng;
            }
            None => {
                self.draft = Some(DraftLocation {
                    point,
                    address: String::new(),
                    details: location_details(&RawAddress::default(), point),
                });
            }
        }

        Some(self.issue(LookupKind::Reverse))
    }

    /// Feeds back a reverse-geocode result. Stale tickets are dropped. A
    /// failed lookup is logged and the draft keeps its last-known textual
    /// fields alongside the already-updated coordinates; the picker stays
    /// fully usable either way.
    pub fn complete_reverse(
        &mut self,
        ticket: LookupTicket,
        result: Result<RawAddress, GeocodeError>,
    ) {
        if !self.accept(ticket, LookupKind::Reverse) {
            return;
        }

        match result {
            Ok(raw) => {
                let Some(draft) = self.draft.as_mut() else {
                    return;
                };
                let details = location_details(&raw, draft.point);
                let address = details.full_address.clone();
                draft.address = address.clone();
                draft.details = details;
                self.query = address;
            }
            Err(error) => {
                tracing::warn!(%error, "reverse geocode failed, keeping last-known address");
            }
        }
    }

    /// Accepts the query text as a forward search. Returns what to send to
    /// the geocoder, or `None` outside the map view or when the trimmed
    /// text is blank (blank searches are simply not dispatched).
    pub fn submit_search(&mut self) -> Option<SearchRequest> {
        if self.view != View::Map {
            return None;
        }
        let query = self.query.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_string();
        Some(SearchRequest {
            ticket: self.issue(LookupKind::Search),
            query,
        })
    }

    /// Feeds back a forward-search result.
    ///
    /// The best match becomes the draft (point, normalized details and
    /// query text) and the camera move to apply is returned. Zero matches
    /// and outright failures surface as notices with the draft untouched.
    /// Stale tickets resolve to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`PickerError::AddressNotFound`] when nothing matched,
    /// [`PickerError::SearchFailed`] when the lookup itself failed.
    pub fn complete_search(
        &mut self,
        ticket: LookupTicket,
        result: Result<Vec<GeocodeMatch>, GeocodeError>,
    ) -> Result<Option<MapCamera>, PickerError> {
        if !self.accept(ticket, LookupKind::Search) {
            return Ok(None);
        }

        let matches = match result {
            Ok(matches) => matches,
            Err(error) => {
                tracing::warn!(%error, "forward geocode failed");
                return Err(PickerError::SearchFailed);
            }
        };

        let Some(hit) = matches.into_iter().next() else {
            return Err(PickerError::AddressNotFound);
        };

        let details = location_details(&hit.address, hit.point);
        self.query = details.full_address.clone();
        self.draft = Some(DraftLocation {
            point: hit.point,
            address: details.full_address.clone(),
            details,
        });

        Ok(Some(MapCamera {
            center: hit.point,
            zoom: FOCUS_ZOOM,
        }))
    }

    /// Asks for the device position. Returns the ticket the completion must
    /// present, or `None` outside the map view.
    pub fn request_position(&mut self) -> Option<LookupTicket> {
        if self.view != View::Map {
            return None;
        }
        Some(self.issue(LookupKind::Position))
    }

    /// Feeds back a device-position result. A fix is adopted as-is (the
    /// point with empty details under [`MY_LOCATION_LABEL`]) and no
    /// reverse lookup is started for it. Failures surface as notices with
    /// the draft untouched. Stale tickets are dropped.
    ///
    /// # Errors
    ///
    /// [`PickerError::PositionUnsupported`] when no sensor exists,
    /// [`PickerError::PositionUnavailable`] when it produced no fix.
    pub fn complete_position(
        &mut self,
        ticket: LookupTicket,
        result: Result<Coordinates, PositionError>,
    ) -> Result<(), PickerError> {
        if !self.accept(ticket, LookupKind::Position) {
            return Ok(());
        }

        let point = match result {
            Ok(point) => point,
            Err(PositionError::Unsupported) => return Err(PickerError::PositionUnsupported),
            Err(PositionError::Unavailable(reason)) => {
                tracing::warn!(%reason, "device position unavailable");
                return Err(PickerError::PositionUnavailable);
            }
        };

        self.draft = Some(DraftLocation {
            point,
            address: MY_LOCATION_LABEL.to_string(),
            details: location_details(&RawAddress::default(), point),
        });
        self.query = MY_LOCATION_LABEL.to_string();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Confirm view
    // ------------------------------------------------------------------

    /// Map → Confirm. Outside the map view this does nothing.
    ///
    /// # Errors
    ///
    /// [`PickerError::NothingSelected`] when no point has been chosen yet;
    /// the view does not change.
    pub fn confirm(&mut self) -> Result<(), PickerError> {
        if self.view != View::Map {
            return Ok(());
        }
        if self.draft.is_none() {
            return Err(PickerError::NothingSelected);
        }
        self.pending = None;
        self.view = View::Confirm;
        Ok(())
    }

    /// Steps back one view. Confirm → Map keeps the draft for further
    /// editing; Map → List discards it. Any outstanding lookup becomes
    /// stale.
    pub fn back(&mut self) {
        self.pending = None;
        match self.view {
            View::Confirm => self.view = View::Map,
            View::Map => {
                self.draft = None;
                self.view = View::List;
            }
            View::List => {}
        }
    }

    /// Saves the draft under the trimmed query text as its name and returns
    /// the persisted record, the terminal outcome of the session. When no
    /// lookup ever produced an address, the `"lat, lng"` form of the point
    /// stands in.
    ///
    /// # Errors
    ///
    /// [`PickerError::MissingNameOrLocation`] when there is no draft or the
    /// trimmed name is empty; the draft and view are left as they were.
    pub fn save(&mut self) -> Result<SavedLocation, PickerError> {
        let name = self.query.trim().to_string();
        let draft = match (&self.draft, name.is_empty()) {
            (Some(draft), false) => draft.clone(),
            _ => return Err(PickerError::MissingNameOrLocation),
        };

        let address = if draft.address.trim().is_empty() {
            draft.point.to_string()
        } else {
            draft.address.clone()
        };

        let saved = self.store.add(&name, draft.point, address, draft.details);
        self.draft = None;
        self.pending = None;
        Ok(saved)
    }

    /// Consumes the session, returning the store.
    pub fn into_store(self) -> LocationStore<S> {
        self.store
    }

    // ------------------------------------------------------------------
    // Lookup bookkeeping
    // ------------------------------------------------------------------

    /// Issues a fresh ticket, superseding whatever was outstanding. One
    /// slot serves every lookup kind: they all feed the same draft, so the
    /// latest request wins regardless of kind.
    fn issue(&mut self, kind: LookupKind) -> LookupTicket {
        self.next_seq += 1;
        let ticket = LookupTicket {
            seq: self.next_seq,
            kind,
        };
        self.pending = Some(ticket);
        ticket
    }

    /// True when `ticket` is still the outstanding lookup of the expected
    /// kind, consuming the slot. Everything else is stale and dropped.
    fn accept(&mut self, ticket: LookupTicket, kind: LookupKind) -> bool {
        if ticket.kind != kind {
            tracing::debug!(?ticket, "dropping completion with mismatched lookup kind");
            return false;
        }
        if self.pending != Some(ticket) {
            tracing::debug!(?ticket, "dropping stale lookup completion");
            return false;
        }
        self.pending = None;
        true
    }
}
