//! Request decoding and response encoding for the prediction endpoint
//!
//! The wire format is JSON only. A body is either one `{home_team, away_team}`
//! object or an array of them; the response mirrors that shape.

use crate::error::{ForecastError, Result};
use crate::rating::model::EloModel;
use crate::types::{Prediction, PredictionRequest};
use serde::{Deserialize, Serialize};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Decoded request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InferenceRequest {
    Single(PredictionRequest),
    Batch(Vec<PredictionRequest>),
}

impl InferenceRequest {
    pub fn len(&self) -> usize {
        match self {
            InferenceRequest::Single(_) => 1,
            InferenceRequest::Batch(requests) => requests.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Predictions in the same shape as the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InferenceResponse {
    Single(Prediction),
    Batch(Vec<Prediction>),
}

impl InferenceResponse {
    pub fn predictions(&self) -> &[Prediction] {
        match self {
            InferenceResponse::Single(prediction) => std::slice::from_ref(prediction),
            InferenceResponse::Batch(predictions) => predictions,
        }
    }
}

/// Strip parameters such as `; charset=utf-8` from a media type
fn media_type(header: &str) -> &str {
    header.split(';').next().unwrap_or("").trim()
}

/// Parse a request body sent with the given content type
pub fn decode_request(body: &[u8], content_type: &str) -> Result<InferenceRequest> {
    if !media_type(content_type).eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
        return Err(ForecastError::UnsupportedContentType {
            content_type: content_type.to_string(),
        }
        .into());
    }

    serde_json::from_slice(body).map_err(|e| {
        ForecastError::InvalidRequest {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Check that the caller accepts JSON
///
/// An absent header or a wildcard counts as acceptance.
pub fn negotiate_accept(accept: Option<&str>) -> Result<()> {
    let Some(accept) = accept else {
        return Ok(());
    };
    if accept.trim().is_empty() {
        return Ok(());
    }

    let acceptable = accept.split(',').map(media_type).any(|candidate| {
        candidate == "*/*"
            || candidate.eq_ignore_ascii_case("application/*")
            || candidate.eq_ignore_ascii_case(JSON_CONTENT_TYPE)
    });

    if acceptable {
        Ok(())
    } else {
        Err(ForecastError::UnsupportedAccept {
            accept: accept.to_string(),
        }
        .into())
    }
}

/// Serialize predictions for a caller with the given `Accept` header
pub fn encode_response(response: &InferenceResponse, accept: Option<&str>) -> Result<String> {
    negotiate_accept(accept)?;
    Ok(serde_json::to_string(response)?)
}

/// Run every request in the body against the model
pub fn predict_request(model: &EloModel, request: &InferenceRequest) -> InferenceResponse {
    match request {
        InferenceRequest::Single(req) => {
            InferenceResponse::Single(model.predict(&req.home_team, &req.away_team))
        }
        InferenceRequest::Batch(requests) => InferenceResponse::Batch(
            requests
                .iter()
                .map(|req| model.predict(&req.home_team, &req.away_team))
                .collect(),
        ),
    }
}
