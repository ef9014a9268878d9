//! Firebase Realtime Database client seam.
//!
//! The plugin talks to the database through the `FirebaseClient` trait so
//! that tests (and hosts) can substitute their own implementation. The
//! production implementation speaks the RTDB REST API.

mod client;
mod http;
mod rest_client;

pub use client::{ClientError, FirebaseClient};
pub use rest_client::RestFirebaseClient;
