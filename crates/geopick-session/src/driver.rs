//! Async glue between the session and its collaborators.

use std::sync::Arc;

use geopick_core::{Coordinates, Geocoder, PositionSource};
use geopick_store::Storage;

use crate::session::{MapCamera, PickerError, PickerSession};

/// Drives a [`PickerSession`] against real collaborators: each method
/// issues a ticket, awaits the call, and feeds the completion back. The
/// session's ticket guard, not call scheduling, is what keeps stale
/// results out.
pub struct PickerDriver<S: Storage> {
    session: PickerSession<S>,
    geocoder: Arc<dyn Geocoder>,
    positions: Arc<dyn PositionSource>,
}

impl<S: Storage> PickerDriver<S> {
    pub fn new(
        session: PickerSession<S>,
        geocoder: Arc<dyn Geocoder>,
        positions: Arc<dyn PositionSource>,
    ) -> Self {
        Self {
            session,
            geocoder,
            positions,
        }
    }

    /// The underlying session, for rendering and synchronous intents.
    pub fn session(&self) -> &PickerSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PickerSession<S> {
        &mut self.session
    }

    /// Consumes the driver, returning the session.
    pub fn into_session(self) -> PickerSession<S> {
        self.session
    }

    /// Map click or marker drag: updates the draft point, then reverse
    /// geocodes it. A failed lookup is absorbed by the session (logged,
    /// last-known address kept), so this cannot fail.
    pub async fn place_marker(&mut self, point: Coordinates) {
        let Some(ticket) = self.session.place_marker(point) else {
            return;
        };
        let result = self.geocoder.reverse_geocode(point).await;
        self.session.complete_reverse(ticket, result);
    }

    /// Forward-searches the query text and pans to the best match. Blank
    /// queries are not dispatched and resolve to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`PickerError::AddressNotFound`] and [`PickerError::SearchFailed`]
    /// per the session's search policy.
    pub async fn search(&mut self) -> Result<Option<MapCamera>, PickerError> {
        let Some(request) = self.session.submit_search() else {
            return Ok(None);
        };
        let result = self.geocoder.forward_geocode(&request.query).await;
        self.session.complete_search(request.ticket, result)
    }

    /// Adopts the device position as the draft.
    ///
    /// # Errors
    ///
    /// [`PickerError::PositionUnsupported`] and
    /// [`PickerError::PositionUnavailable`] per the session's policy.
    pub async fn locate(&mut self) -> Result<(), PickerError> {
        let Some(ticket) = self.session.request_position() else {
            return Ok(());
        };
        let result = self.positions.current_position().await;
        self.session.complete_position(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use geopick_core::{GeocodeError, GeocodeMatch, PositionError, RawAddress};
    use geopick_store::{LocationStore, MemoryStorage};

    use super::*;

    /// Geocoder with canned answers; `None` means the lookup fails.
    struct FakeGeocoder {
        reverse: Option<RawAddress>,
        matches: Option<Vec<GeocodeMatch>>,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn reverse_geocode(
            &self,
            _point: Coordinates,
        ) -> Result<RawAddress, GeocodeError> {
            self.reverse
                .clone()
                .ok_or_else(|| GeocodeError::Request("offline".to_string()))
        }

        async fn forward_geocode(
            &self,
            _query: &str,
        ) -> Result<Vec<GeocodeMatch>, GeocodeError> {
            self.matches
                .clone()
                .ok_or_else(|| GeocodeError::Request("offline".to_string()))
        }
    }

    /// Position source with one canned fix; `None` means unsupported.
    struct FixedPosition(Option<Coordinates>);

    #[async_trait]
    impl PositionSource for FixedPosition {
        async fn current_position(&self) -> Result<Coordinates, PositionError> {
            self.0.ok_or(PositionError::Unsupported)
        }
    }

    fn home() -> Coordinates {
        Coordinates::new(41.311_081, 69.240_562)
    }

    fn bag(display_name: &str) -> RawAddress {
        RawAddress {
            display_name: Some(display_name.to_string()),
            ..RawAddress::default()
        }
    }

    fn driver(
        reverse: Option<RawAddress>,
        matches: Option<Vec<GeocodeMatch>>,
        fix: Option<Coordinates>,
    ) -> PickerDriver<MemoryStorage> {
        let session = PickerSession::new(LocationStore::load(MemoryStorage::new()), home());
        PickerDriver::new(
            session,
            Arc::new(FakeGeocoder { reverse, matches }),
            Arc::new(FixedPosition(fix)),
        )
    }

    #[tokio::test]
    async fn place_marker_fills_the_address_from_the_lookup() {
        let mut driver = driver(Some(bag("Amir Temur Avenue")), None, None);
        driver.session_mut().open_map();

        driver.place_marker(Coordinates::new(41.0, 69.0)).await;

        let draft = driver.session().draft().unwrap();
        assert_eq!(draft.address, "Amir Temur Avenue");
        assert_eq!(driver.session().query(), "Amir Temur Avenue");
    }

    #[tokio::test]
    async fn place_marker_keeps_coordinates_when_the_lookup_fails() {
        let mut driver = driver(None, None, None);
        driver.session_mut().open_map();

        let point = Coordinates::new(41.0, 69.0);
        driver.place_marker(point).await;

        let draft = driver.session().draft().unwrap();
        assert_eq!(draft.point, point);
        assert_eq!(draft.address, "");
    }

    #[tokio::test]
    async fn search_pans_to_the_best_match() {
        let point = Coordinates::new(41.350_817, 69.284_669);
        let matches = vec![GeocodeMatch {
            point,
            address: bag("Tashkent Tower"),
        }];
        let mut driver = driver(None, Some(matches), None);
        driver.session_mut().open_map();
        driver.session_mut().set_query("tashkent tower");

        let camera = driver.search().await.unwrap().unwrap();
        assert_eq!(camera.center, point);
        assert_eq!(driver.session().draft().unwrap().address, "Tashkent Tower");
    }

    #[tokio::test]
    async fn search_failure_surfaces_the_notice() {
        let mut driver = driver(None, None, None);
        driver.session_mut().open_map();
        driver.session_mut().set_query("tashkent");

        assert_eq!(driver.search().await, Err(PickerError::SearchFailed));
    }

    #[tokio::test]
    async fn blank_search_is_a_quiet_noop() {
        let mut driver = driver(None, None, None);
        driver.session_mut().open_map();

        assert_eq!(driver.search().await, Ok(None));
    }

    #[tokio::test]
    async fn locate_adopts_the_device_fix() {
        let fix = Coordinates::new(40.123_456, 64.987_654);
        let mut driver = driver(None, None, Some(fix));
        driver.session_mut().open_map();

        driver.locate().await.unwrap();

        let draft = driver.session().draft().unwrap();
        assert_eq!(draft.point, fix);
        assert_eq!(draft.address, crate::MY_LOCATION_LABEL);
    }

    #[tokio::test]
    async fn locate_without_a_sensor_surfaces_the_notice() {
        let mut driver = driver(None, None, None);
        driver.session_mut().open_map();

        assert_eq!(driver.locate().await, Err(PickerError::PositionUnsupported));
    }
}
