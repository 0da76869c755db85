//! Application module: ties the stores, the catalog and persistence together.
//!
//! The `App` model lives in `app::model`; loading and saving each store's
//! persisted key lives in `app::persist`.

mod model;
mod persist;

pub use model::*;
