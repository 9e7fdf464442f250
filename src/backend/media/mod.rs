//! Media Module
//!
//! Local storage for uploaded post images and profile pictures.
//!
//! # Module Structure
//!
//! ```text
//! media/
//! ├── mod.rs    - Module exports
//! └── upload.rs - `MediaStore`, upload validation and file naming
//! ```

pub mod upload;

pub use upload::{MediaError, MediaStore, Upload, UPLOADS_ROUTE};
