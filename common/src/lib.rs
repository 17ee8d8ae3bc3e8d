//! Models shared between the certificate backend and any client talking to it.

pub mod jobs;
pub mod model;
pub mod requests;
