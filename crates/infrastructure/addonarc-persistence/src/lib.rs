mod api;
mod error;
mod json_store;
mod paths;

pub use api::*;
pub use error::*;
pub use json_store::JsonArchiveStore;
pub use paths::{sanitize_component, DataLayout};
