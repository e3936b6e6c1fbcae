//! # Payment Error Types
//!
//! Typed error handling for the payrail provider layer.
//! All provider operations return `Result<T, PaymentError>`.
//!
//! Every variant names the step that failed. Variants produced by a remote
//! call carry the underlying [`GatewayError`] as their source so callers can
//! branch on the kind without matching strings.

use thiserror::Error;

/// Underlying cause of a failed gateway call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure (connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// Gateway answered with a non-success status
    #[error("gateway returned HTTP {status}: {message}")]
    Status {
        status: u16,
        /// Gateway error name (e.g. `INVALID_RESOURCE_ID`)
        name: Option<String>,
        message: String,
        /// Gateway correlation id, quoted when opening a support case
        debug_id: Option<String>,
    },

    /// Response body did not have the expected shape
    #[error("could not decode gateway response: {0}")]
    Decode(String),

    /// Access token could not be obtained
    #[error("gateway authorization failed: {0}")]
    Auth(String),
}

impl GatewayError {
    /// HTTP status of the gateway response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// How a caller should treat a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Caller input was rejected before any remote side effect
    Rejected,
    /// No funds moved; the caller may retry
    Retryable,
    /// Misconfiguration; the provider must not serve requests
    Fatal,
    /// Funds may have moved; reconcile out-of-band before retrying
    Reconcile,
}

/// Core error type for all provider operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing credentials, failed handshake)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No provider registered under this name
    #[error("Unknown payment provider: {0}")]
    UnknownProvider(String),

    /// Malformed or missing caller input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Gateway has no record of the referenced payment
    #[error("Payment {payment_id} not found at gateway")]
    UpstreamNotFound {
        payment_id: String,
        #[source]
        source: GatewayError,
    },

    /// Gateway record violates the single-transaction assumption
    #[error("Unexpected gateway state: {0}")]
    UnexpectedGatewayState(String),

    /// Requested amount/currency differs from the gateway's pending record
    #[error("Amount mismatch: requested {expected_total} {expected_currency}, gateway has {actual_total} {actual_currency}")]
    AmountMismatch {
        expected_total: String,
        expected_currency: String,
        actual_total: String,
        actual_currency: String,
    },

    /// Fetching the payment record failed for a reason other than not-found
    #[error("Fetching payment {payment_id} failed")]
    FetchFailed {
        payment_id: String,
        #[source]
        source: GatewayError,
    },

    /// Non-monetary patch of the gateway record failed; no funds moved
    #[error("Updating payment {payment_id} with order details failed")]
    ReconciliationUpdateFailed {
        payment_id: String,
        #[source]
        source: GatewayError,
    },

    /// Execute/capture failed after reconciliation; outcome unknown
    #[error("Capturing payment {payment_id} failed")]
    CaptureFailed {
        payment_id: String,
        #[source]
        source: GatewayError,
    },

    /// Refund call failed
    #[error("Refunding transaction {transaction_id} failed")]
    RefundFailed {
        transaction_id: String,
        #[source]
        source: GatewayError,
    },

    /// One-time checkout experience creation failed; nothing was cached
    #[error("Creating checkout experience failed")]
    ExperienceCreationFailed(#[source] GatewayError),

    /// Creating the pending payment failed
    #[error("Creating preauthorization failed")]
    PreauthorizationFailed(#[source] GatewayError),
}

impl PaymentError {
    /// Classify this error for the caller's retry/reconcile decision
    pub fn class(&self) -> FailureClass {
        match self {
            PaymentError::Configuration(_) | PaymentError::UnknownProvider(_) => {
                FailureClass::Fatal
            }
            PaymentError::InvalidRequest(_)
            | PaymentError::AmountMismatch { .. }
            | PaymentError::UpstreamNotFound { .. }
            | PaymentError::UnexpectedGatewayState(_) => FailureClass::Rejected,
            PaymentError::FetchFailed { .. }
            | PaymentError::ReconciliationUpdateFailed { .. }
            | PaymentError::ExperienceCreationFailed(_)
            | PaymentError::PreauthorizationFailed(_) => FailureClass::Retryable,
            PaymentError::CaptureFailed { .. } | PaymentError::RefundFailed { .. } => {
                FailureClass::Reconcile
            }
        }
    }

    /// Returns true if a caller-level retry cannot move money twice
    pub fn is_retryable(&self) -> bool {
        self.class() == FailureClass::Retryable
    }

    /// Stable snake_case name of the variant, for logs and API bodies
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentError::Configuration(_) => "configuration",
            PaymentError::UnknownProvider(_) => "unknown_provider",
            PaymentError::InvalidRequest(_) => "invalid_request",
            PaymentError::UpstreamNotFound { .. } => "upstream_not_found",
            PaymentError::UnexpectedGatewayState(_) => "unexpected_gateway_state",
            PaymentError::AmountMismatch { .. } => "amount_mismatch",
            PaymentError::FetchFailed { .. } => "fetch_failed",
            PaymentError::ReconciliationUpdateFailed { .. } => "reconciliation_update_failed",
            PaymentError::CaptureFailed { .. } => "capture_failed",
            PaymentError::RefundFailed { .. } => "refund_failed",
            PaymentError::ExperienceCreationFailed(_) => "experience_creation_failed",
            PaymentError::PreauthorizationFailed(_) => "preauthorization_failed",
        }
    }
}

/// Result type alias for provider operations
pub type PaymentResult<T> = Result<T, PaymentError>;
