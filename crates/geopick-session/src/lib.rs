//! The picker flow itself: a synchronous state machine over three views
//! ([`View::List`], [`View::Map`], [`View::Confirm`]) plus the async driver
//! that binds it to a geocoder and a position source.

mod driver;
mod session;

pub use driver::PickerDriver;
pub use session::{
    DraftLocation, LookupTicket, MapCamera, PickerError, PickerSession, SearchRequest, View,
    FOCUS_ZOOM, MY_LOCATION_LABEL,
};
