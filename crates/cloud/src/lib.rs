//! HTTP clients for the remote services a kiosk session depends on.
//!
//! - [`runpod`]: serverless face-swap job submission and status queries.
//! - [`storage`]: public-bucket object storage for captures, framed
//!   results, and the reference-image catalog.
//! - [`http_image`]: plain HTTP fetch of image bytes for compositing.

pub mod http_image;
pub mod runpod;
pub mod storage;
