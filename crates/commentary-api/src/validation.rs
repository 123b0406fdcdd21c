//! Request validation for the commentary endpoints.
//!
//! Every check here is a pure function returning either the validated
//! value or a [`ValidationDetails`] describing what failed. The handlers
//! turn failures into `400` responses; nothing in this module touches the
//! store.

use std::collections::BTreeMap;
use std::num::IntErrorKind;

use commentary_types::{MatchId, Metadata, NewCommentary};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of entries returned when `limit` is omitted.
pub const DEFAULT_LIMIT: u32 = 100;

/// Upper bound on entries returned by a single list request.
pub const MAX_LIMIT: u32 = 100;

/// Field-keyed description of a failed validation.
///
/// `formErrors` holds problems with the input as a whole (malformed JSON,
/// wrong top-level type); `fieldErrors` maps each offending field to its
/// messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetails {
    /// Errors not attributable to a single field.
    pub form_errors: Vec<String>,
    /// Errors keyed by field name.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationDetails {
    /// Details carrying one whole-input error.
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }

    /// Details carrying one error for `field`.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut details = Self::default();
        details.push_field(field, message);
        details
    }

    /// Record an additional error for `field`.
    pub fn push_field(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Whether no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }
}

impl From<validator::ValidationErrors> for ValidationDetails {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Self::default();
        for (field, field_errors) in errors.field_errors() {
            let key = snake_to_camel(&field);
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                details.push_field(&key, message);
            }
        }
        details
    }
}

/// Query parameters accepted by the list endpoint, before validation.
///
/// Values stay as strings so malformed input is reported through
/// [`ValidationDetails`] instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListCommentaryQuery {
    /// Requested page size.
    pub limit: Option<String>,
}

/// Request body of the create endpoint.
///
/// Required fields are `Option`s so a missing field is reported per field
/// rather than as a single deserialization error. A `matchId` key in the
/// body is ignored.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentaryBody {
    /// Match minute.
    #[validate(
        required(message = "Required"),
        range(min = 0, message = "Number must be greater than or equal to 0")
    )]
    pub minute: Option<i32>,

    /// Same-minute ordering.
    #[validate(
        required(message = "Required"),
        range(min = 0, message = "Number must be greater than or equal to 0")
    )]
    pub sequence: Option<i32>,

    /// Period label.
    #[validate(
        required(message = "Required"),
        length(min = 1, max = 32, message = "String must contain between 1 and 32 characters")
    )]
    pub period: Option<String>,

    /// Event category.
    #[validate(
        required(message = "Required"),
        length(min = 1, max = 64, message = "String must contain between 1 and 64 characters")
    )]
    pub event_type: Option<String>,

    /// Actor attribution.
    #[validate(length(max = 128, message = "String must contain at most 128 characters"))]
    pub actor: Option<String>,

    /// Team attribution.
    #[validate(length(max = 128, message = "String must contain at most 128 characters"))]
    pub team: Option<String>,

    /// Commentary text.
    #[validate(
        required(message = "Required"),
        length(min = 1, max = 2000, message = "String must contain between 1 and 2000 characters")
    )]
    pub message: Option<String>,

    /// Structured payload.
    pub metadata: Option<Metadata>,

    /// Labels.
    #[validate(length(max = 32, message = "Array must contain at most 32 element(s)"))]
    pub tags: Option<Vec<String>>,
}

/// Validate the `id` path segment as a match identifier.
///
/// Accepts positive integers only.
pub fn parse_match_id(raw: &str) -> Result<MatchId, ValidationDetails> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(MatchId(id)),
        Ok(_) => Err(ValidationDetails::field("id", "Number must be greater than 0")),
        Err(_) => Err(ValidationDetails::field(
            "id",
            format!("Expected a positive integer, received \"{raw}\""),
        )),
    }
}

/// Validate list query parameters and return the requested page size.
///
/// `None` means the client did not ask for a specific size. Values past
/// the `u32` range are saturated; [`effective_limit`] caps them anyway.
pub fn parse_list_query(query: &ListCommentaryQuery) -> Result<Option<u32>, ValidationDetails> {
    let Some(raw) = query.limit.as_deref() else {
        return Ok(None);
    };

    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ValidationDetails::field("limit", "Number must be greater than 0")),
        Ok(limit) => Ok(Some(limit)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(Some(u32::MAX)),
        Err(_) => Err(ValidationDetails::field(
            "limit",
            format!("Expected a positive integer, received \"{raw}\""),
        )),
    }
}

/// Page size actually used for a list query.
pub fn effective_limit(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

/// Validate a create body and bind it to the match from the path.
pub fn parse_create_body(
    match_id: MatchId,
    body: serde_json::Value,
) -> Result<NewCommentary, ValidationDetails> {
    if !body.is_object() {
        return Err(ValidationDetails::form("Expected object"));
    }

    let body: CreateCommentaryBody =
        serde_json::from_value(body).map_err(|e| ValidationDetails::form(e.to_string()))?;

    let mut details = body
        .validate()
        .err()
        .map(ValidationDetails::from)
        .unwrap_or_default();

    if body
        .tags
        .as_ref()
        .is_some_and(|tags| tags.iter().any(|tag| tag.trim().is_empty()))
    {
        details.push_field("tags", "Tags must not be empty");
    }

    if !details.is_empty() {
        return Err(details);
    }

    let (Some(minute), Some(sequence), Some(period), Some(event_type), Some(message)) = (
        body.minute,
        body.sequence,
        body.period,
        body.event_type,
        body.message,
    ) else {
        return Err(ValidationDetails::form("Required fields missing"));
    };

    Ok(NewCommentary {
        match_id,
        minute,
        sequence,
        period,
        event_type,
        actor: body.actor,
        team: body.team,
        message,
        metadata: body.metadata,
        tags: body.tags,
    })
}

/// Convert a Rust field name to the camelCase key clients send.
fn snake_to_camel(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
