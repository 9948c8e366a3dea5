//! JSON status bodies and the responder that maps engine failures onto HTTP
//! statuses.
//!
//! Every [`EngineError`] variant maps to exactly one status code, so clients
//! can branch on the response without parsing the message text.

use okapi::openapi3::{RefOr, Response as OpenApiResponse, Responses};
use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::JsonSchema;

use crate::engine::error::EngineError;

/// The JSON body of every error response.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Status {
    pub code: String,
    pub message: String,
}

pub fn new_status(code: &str, message: String) -> Status {
    Status {
        code: code.to_string(),
        message,
    }
}

/// An engine failure plus the HTTP status it travels under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: rocket::http::Status,
    pub body: Status,
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        use rocket::http::Status as Http;
        let status = match &err {
            EngineError::NotFound(_) => Http::NotFound,
            EngineError::NotChallengeParty => Http::Forbidden,
            EngineError::RateLimited { .. } => Http::TooManyRequests,
            EngineError::ChallengeExpired => Http::Gone,
            EngineError::AlreadyTuned(_)
            | EngineError::AlreadyResolved
            | EngineError::CardNoLongerOwned(_)
            | EngineError::InsufficientXp { .. } => Http::Conflict,
            EngineError::InsufficientCards { .. }
            | EngineError::IncompleteAssignment(_)
            | EngineError::MaxStageReached
            | EngineError::CardNotDealt(_)
            | EngineError::CardNotEligible(_)
            | EngineError::OpponentRequired
            | EngineError::SelfChallenge
            | EngineError::InvalidExpiry => Http::BadRequest,
        };
        ApiError {
            status,
            body: new_status(err.code(), err.to_string()),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status;
        let mut response = Json(self.body).respond_to(request)?;
        response.set_status(status);
        Ok(response)
    }
}

impl OpenApiResponderInner for ApiError {
    fn responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();
        for (status, description) in [
            ("400", "The request broke a game rule."),
            ("403", "The caller is not a party to this challenge."),
            ("404", "The referenced entity does not exist."),
            ("409", "The request conflicts with the current state."),
            ("410", "The challenge has expired."),
            ("429", "The challenge-creation cap is reached."),
        ] {
            responses.responses.insert(
                status.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}
