//! Error taxonomy for OCCAM.
//!
//! Mirrors the shape of a typical layered-crate error type: a small enum of
//! named conditions, a `Cow`-backed message so construction from `&'static
//! str` and owned `String` is equally cheap, and a `Context` variant for
//! wrapping a lower-level error with a human explanation as it crosses a
//! module boundary.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

pub type OccamResult<T> = Result<T, OccamError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidCardinality,
    DuplicateAbbrev,
    InvalidData,
    ParseModel,
    InvalidParams,
    FitNonConverged,
    Cancelled,
    Internal,
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrString(Cow<'static, str>);

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<Cow<'static, str>>> From<T> for ErrString {
    fn from(v: T) -> Self {
        Self(v.into())
    }
}

#[derive(Debug)]
pub enum OccamError {
    /// A variable was declared with `cardinality < 2`.
    InvalidCardinality { message: ErrString },
    /// Two variables in a registry share an abbreviation.
    DuplicateAbbrev { message: ErrString },
    /// An observed tuple violates the declared variable structure.
    InvalidData { message: ErrString },
    /// A model expression (seed model, fit request) is malformed or
    /// references an unknown abbreviation.
    ParseModel { message: ErrString },
    /// Search parameters are out of range (width/levels < 1, unknown
    /// filter/direction/sort).
    InvalidParams { message: ErrString },
    /// IPF hit its iteration cap without converging. Carried as a value
    /// alongside the last-iterate statistics by callers that want to keep
    /// going; constructible as a hard error for callers evaluating a single
    /// model with no search wrapping it.
    FitNonConverged { message: ErrString, iterations: usize },
    /// The search was asked to stop.
    Cancelled { message: ErrString },
    /// An invariant was violated (NaN statistic, negative probability).
    /// Fatal to the model that produced it, not to the caller.
    Internal { message: ErrString },
    /// A lower-level error annotated with context as it propagates up.
    Context {
        context: ErrString,
        source: Box<OccamError>,
    },
}

impl OccamError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCardinality { .. } => ErrorCode::InvalidCardinality,
            Self::DuplicateAbbrev { .. } => ErrorCode::DuplicateAbbrev,
            Self::InvalidData { .. } => ErrorCode::InvalidData,
            Self::ParseModel { .. } => ErrorCode::ParseModel,
            Self::InvalidParams { .. } => ErrorCode::InvalidParams,
            Self::FitNonConverged { .. } => ErrorCode::FitNonConverged,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
            Self::Internal { .. } => ErrorCode::Internal,
            Self::Context { .. } => ErrorCode::Context,
        }
    }

    pub fn with_context(self, msg: impl Into<String>) -> Self {
        OccamError::Context {
            context: msg.into().into(),
            source: Box::new(self),
        }
    }
}

impl Display for OccamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCardinality { message } => write!(f, "invalid cardinality: {message}"),
            Self::DuplicateAbbrev { message } => write!(f, "duplicate abbreviation: {message}"),
            Self::InvalidData { message } => write!(f, "invalid data: {message}"),
            Self::ParseModel { message } => write!(f, "malformed model expression: {message}"),
            Self::InvalidParams { message } => write!(f, "invalid search parameters: {message}"),
            Self::FitNonConverged { message, iterations } => {
                write!(f, "fit did not converge after {iterations} iterations: {message}")
            }
            Self::Cancelled { message } => write!(f, "cancelled: {message}"),
            Self::Internal { message } => write!(f, "internal invariant violated: {message}"),
            Self::Context { context, source } => write!(f, "{context}\ncaused by: {source}"),
        }
    }
}

impl std::error::Error for OccamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> OccamResult<T>;
    fn with_context<F: FnOnce() -> String>(self, f: F) -> OccamResult<T>;
}

impl<T> ResultExt<T> for OccamResult<T> {
    fn context(self, msg: impl Into<String>) -> OccamResult<T> {
        self.map_err(|e| e.with_context(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> OccamResult<T> {
        self.map_err(|e| e.with_context(f()))
    }
}

#[doc(hidden)]
pub mod __private {
    #[inline]
    #[cold]
    #[must_use]
    pub fn must_use<E>(e: E) -> E {
        e
    }
}

#[macro_export]
macro_rules! occam_err {
    (InvalidCardinality: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::OccamError::InvalidCardinality { message: format!($fmt, $($arg),*).into() })
    };
    (DuplicateAbbrev: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::OccamError::DuplicateAbbrev { message: format!($fmt, $($arg),*).into() })
    };
    (InvalidData: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::OccamError::InvalidData { message: format!($fmt, $($arg),*).into() })
    };
    (ParseModel: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::OccamError::ParseModel { message: format!($fmt, $($arg),*).into() })
    };
    (InvalidParams: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::OccamError::InvalidParams { message: format!($fmt, $($arg),*).into() })
    };
    (Cancelled: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::OccamError::Cancelled { message: format!($fmt, $($arg),*).into() })
    };
    (Internal: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::OccamError::Internal { message: format!($fmt, $($arg),*).into() })
    };
}

#[macro_export]
macro_rules! occam_bail {
    ($($tt:tt)+) => { return Err($crate::occam_err!($($tt)+)) };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($tt:tt)+) => {
        if !$cond { $crate::occam_bail!($($tt)+); }
    };
}
