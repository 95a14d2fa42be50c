//! # Errors
//!
//! hostpress carries one structured error type through `anyhow::Error` so
//! that services, hooks and stores can all `?`-propagate while the HTTP
//! boundary still recovers the original kind:
//! - consistent status codes + names
//! - can be carried through anyhow::Error (for the hook pipeline)
//! - transport-agnostic (the axum crate decides how to serialize)

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::Value;

/// A convenience result type for hostpress core APIs.
pub type HostpressResult<T> = std::result::Result<T, AnyError>;

/// Error classes + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,     // 400
    Unauthorized,   // 401
    NotFound,       // 404
    Conflict,       // 409
    General,        // 500
    NotImplemented, // 501
    Upstream,       // 502
    Unavailable,    // 503
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::General => 500,
            ErrorKind::NotImplemented => 501,
            ErrorKind::Upstream => 502,
            ErrorKind::Unavailable => 503,
        }
    }

    /// Error `name` as it appears in response bodies (e.g. "NotFoundError")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Conflict => "ConflictError",
            ErrorKind::General => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::Upstream => "UpstreamError",
            ErrorKind::Unavailable => "Unavailable",
        }
    }
}

/// A structured hostpress error that can live inside `anyhow::Error`.
///
/// - message: the human-readable summary (`error` on the wire)
/// - details: a detail string (`details` on the wire)
/// - data: optional structured payload (per-field validation errors)
/// - source: the underlying cause, never sent to clients
#[derive(Debug)]
pub struct HostpressError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<String>,
    pub data: Option<Value>,
    pub source: Option<AnyError>,
}

impl HostpressError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            data: None,
            source: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Convert into `anyhow::Error` so it flows through the hook pipeline.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `HostpressError` anywhere in an `anyhow::Error` chain.
    pub fn find(err: &AnyError) -> Option<&HostpressError> {
        err.chain().find_map(|e| e.downcast_ref::<HostpressError>())
    }

    /// Kind of the first `HostpressError` in the chain, if any.
    pub fn kind_of(err: &AnyError) -> Option<ErrorKind> {
        Self::find(err).map(|e| e.kind)
    }

    /// Turn any error into a HostpressError:
    /// - if it already is one, keep it (lossless)
    /// - otherwise wrap as General, keeping the message as details
    pub fn normalize(err: AnyError) -> HostpressError {
        match err.downcast::<HostpressError>() {
            Ok(hp) => hp,
            Err(other) => HostpressError::new(ErrorKind::General, "Internal server error")
                .with_details(other.to_string())
                .with_source(other),
        }
    }

    /// A copy suitable for returning to clients: drops the inner `source`.
    pub fn sanitize_for_client(&self) -> HostpressError {
        HostpressError {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            data: self.data.clone(),
            source: None,
        }
    }

    /// `{ error, details, name, code }` payload, plus `data` when present.
    pub fn to_json(&self) -> Value {
        use serde_json::json;

        let mut base = json!({
            "error": self.message,
            "details": self.details,
            "name": self.name(),
            "code": self.code(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, msg)
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::General, msg)
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Upstream, msg)
    }
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, msg)
    }
}

impl fmt::Display for HostpressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HostpressError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Bail with a HostpressError of the given constructor.
#[macro_export]
macro_rules! bail_hp {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::HostpressError::$ctor($msg).into_anyhow())
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::HostpressError::$ctor(format!($fmt, $($arg)*)).into_anyhow())
    };
}
