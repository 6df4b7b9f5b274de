use chrono::{DateTime, Utc};
use thiserror::Error;

/// Coarse error family, used by the transport boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Forbidden,
    EntryWindow,
    Internal,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Capacity exceeded: {requested} attendees requested, room holds {capacity}")]
    CapacityExceeded { requested: u32, capacity: u32 },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already booked: {0}")]
    AlreadyBooked(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Booking code does not match")]
    CodeMismatch,

    #[error("Booking time not reached: entry opens at {opens_at}")]
    BookingTimeNotReached { opens_at: DateTime<Utc> },

    #[error("Booking time has passed: entry closed at {closed_at}")]
    BookingTimeHasPassed { closed_at: DateTime<Utc> },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn booking_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Booking",
            field: "id",
            value: id.into(),
        }
    }

    pub fn room_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "MeetingRoom",
            field: "id",
            value: id.into(),
        }
    }

    pub fn member_not_found(field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Member",
            field,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidTime(_) | Self::CapacityExceeded { .. } | Self::Validation(_) => {
                ErrorKind::Validation
            }
            Self::AlreadyBooked(_) => ErrorKind::Conflict,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::CodeMismatch
            | Self::BookingTimeNotReached { .. }
            | Self::BookingTimeHasPassed { .. } => ErrorKind::EntryWindow,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { entity, .. } => match *entity {
                "Booking" => "booking_not_found",
                "MeetingRoom" => "room_not_found",
                "Member" => "member_not_found",
                _ => "not_found",
            },
            Self::InvalidTime(_) => "invalid_time",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::Validation(_) => "invalid_request",
            Self::AlreadyBooked(_) => "already_booked",
            Self::Forbidden(_) => "forbidden",
            Self::CodeMismatch => "code_mismatch",
            Self::BookingTimeNotReached { .. } => "booking_time_not_reached",
            Self::BookingTimeHasPassed { .. } => "booking_time_has_passed",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        InfraError::Database(e).into()
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
