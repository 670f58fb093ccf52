//! Image materialization: copying originals and producing thumbnails.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Copy** | `std::fs::copy` after creating ancestors |
//! | **Thumbnail** | `resize_to_fill` (cover + center crop) → WebP or AVIF |
//!
//! The module is split into:
//! - **Parameters**: data structures describing a thumbnail job
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: destination preparation around backend calls

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use operations::{ThumbnailConfig, copy_image, create_thumbnail, plan_thumbnail};
pub use params::{Quality, ThumbnailFormat, ThumbnailParams};
pub use rust_backend::RustBackend;
