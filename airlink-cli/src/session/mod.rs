//! Public extension session state
//!
//! A pure reducer over [`PublicExtensionState`] and the store that owns one
//! instance of it for the server.

pub mod action;
pub mod reducer;
pub mod state;
pub mod store;

pub use action::Action;
pub use reducer::{ReducerError, reduce};
pub use state::{
    ExtensionScreen, FormRecord, LinkedRecordIdsToPrimaryValues, LoadedForm,
    PublicExtensionState, ScreenResult, ScreenState,
};
pub use store::SessionStore;
