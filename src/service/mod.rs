//! Prediction serving
//!
//! JSON request/response handling and the Axum server that exposes a loaded
//! model.

pub mod inference;
pub mod server;

pub use inference::{
    decode_request, encode_response, negotiate_accept, predict_request, InferenceRequest,
    InferenceResponse,
};
pub use server::{InferenceServer, ServerConfig, ServerState};
