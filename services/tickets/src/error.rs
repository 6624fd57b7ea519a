use axum::response::{IntoResponse, Response};

use gatepass_core::error::{ErrorClass, error_response};

/// Why a password login was refused. Kept for logs; both render as the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRejection {
    UnknownUser,
    WrongPassword,
}

/// Why an OTP verification was refused. Kept for logs; all render as the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    UserNotFound,
    NoChallenge,
    Expired,
    AlreadyConsumed,
    CodeMismatch,
}

/// Tickets service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum TicketingError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("too many tickets in one order")]
    CartTooLarge,
    #[error("ticket key is required")]
    MissingTicketKey,
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least 8 characters with upper, lower, digit and special")]
    WeakPassword,
    #[error("invalid offer: {0}")]
    InvalidOffer(String),
    #[error("invalid credentials")]
    InvalidCredentials(LoginRejection),
    #[error("invalid or expired code")]
    InvalidOtp(OtpRejection),
    #[error("invalid token")]
    InvalidToken,
    #[error("forbidden")]
    Forbidden,
    #[error("offer not found")]
    OfferNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("ticket not found")]
    TicketNotFound,
    #[error("email already used")]
    EmailAlreadyUsed,
    #[error("offer code already exists")]
    OfferCodeTaken,
    #[error("offer has issued tickets; deactivate it instead")]
    OfferInUse,
    #[error("duplicate ticket key")]
    DuplicateTicketKey,
    #[error("ticket already consumed")]
    TicketAlreadyConsumed,
    #[error("too many pending codes")]
    TooManyChallenges,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl TicketingError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyCart => "EMPTY_CART",
            Self::CartTooLarge => "CART_TOO_LARGE",
            Self::MissingTicketKey => "MISSING_TICKET_KEY",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidOffer(_) => "INVALID_OFFER",
            Self::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            Self::InvalidOtp(_) => "INVALID_OTP",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::OfferNotFound => "OFFER_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::TicketNotFound => "TICKET_NOT_FOUND",
            Self::EmailAlreadyUsed => "EMAIL_ALREADY_USED",
            Self::OfferCodeTaken => "OFFER_CODE_TAKEN",
            Self::OfferInUse => "OFFER_IN_USE",
            Self::DuplicateTicketKey => "DUPLICATE_TICKET_KEY",
            Self::TicketAlreadyConsumed => "TICKET_ALREADY_CONSUMED",
            Self::TooManyChallenges => "TOO_MANY_CHALLENGES",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyCart
            | Self::CartTooLarge
            | Self::MissingTicketKey
            | Self::InvalidEmail
            | Self::WeakPassword
            | Self::InvalidOffer(_) => ErrorClass::Validation,
            Self::InvalidCredentials(_) | Self::InvalidOtp(_) | Self::InvalidToken => {
                ErrorClass::Unauthorized
            }
            Self::Forbidden => ErrorClass::Forbidden,
            Self::OfferNotFound | Self::OrderNotFound | Self::TicketNotFound => {
                ErrorClass::NotFound
            }
            Self::EmailAlreadyUsed
            | Self::OfferCodeTaken
            | Self::OfferInUse
            | Self::DuplicateTicketKey
            | Self::TicketAlreadyConsumed => ErrorClass::Conflict,
            Self::TooManyChallenges => ErrorClass::RateLimited,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }
}

impl IntoResponse for TicketingError {
    fn into_response(self) -> Response {
        // TraceLayer already records every status; only 500s carry a chain worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        error_response(self.class(), self.kind(), self.to_string())
    }
}
