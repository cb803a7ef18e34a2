//! Data models shared across the pipeline
//!
//! Each sub-module represents one concept of the ingestion and persistence
//! flow. Everything is re-exported here for convenient imports.

mod design_item;
mod hosting;
mod inline_image;
mod user;

pub use design_item::*;
pub use hosting::*;
pub use inline_image::*;
pub use user::*;
