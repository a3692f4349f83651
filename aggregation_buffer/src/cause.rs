use core::{
    any::Any,
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

use anyhow::Error as AnyhowError;
use strum::{AsRefStr, Display as StrumDisplay};

#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, AsRefStr, StrumDisplay,
)]
#[strum(serialize_all = "snake_case")]
pub enum CauseKind {
    BadRequest,
    NotFound,
    #[default]
    Internal,
    Unavailable,
    Panic,
}

/// Failure detail recorded in an [`AggregationBuffer`].
///
/// [`AggregationBuffer`]: crate::AggregationBuffer
#[derive(Debug)]
pub struct Cause {
    kind: CauseKind,
    message: String,
    source: Option<AnyhowError>,
}

impl Display for Cause {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str(&self.message)?;

        if let Some(source) = self.source.as_ref() {
            write!(formatter, ": {source}")?;
        }

        Ok(())
    }
}

impl Error for Cause {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let source: &(dyn Error + 'static) = self.source.as_deref()?;
        Some(source)
    }
}

// An `anyhow::Error` that already wraps a `Cause` is unwrapped rather than nested.
// Any other error is flattened into its full context chain.
impl From<AnyhowError> for Cause {
    fn from(error: AnyhowError) -> Self {
        match error.downcast::<Self>() {
            Ok(cause) => cause,
            Err(error) => Self::msg(format!("{error:#}")),
        }
    }
}

impl From<String> for Cause {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<&str> for Cause {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

impl Cause {
    #[must_use]
    pub fn new(kind: CauseKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn wrap(
        kind: CauseKind,
        message: impl Into<String>,
        source: impl Into<AnyhowError>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(CauseKind::Internal, message)
    }

    /// Converts the payload passed to a panic hook or returned by [`std::panic::catch_unwind`].
    #[must_use]
    pub fn from_panic_payload(payload: Box<dyn Any + Send + 'static>) -> Self {
        let payload = match payload.downcast::<String>() {
            Ok(string) => return Self::new(CauseKind::Panic, *string),
            Err(other) => other,
        };

        if let Ok(string) = payload.downcast::<&str>() {
            return Self::new(CauseKind::Panic, *string);
        }

        Self::new(CauseKind::Panic, "panic with payload of unknown type")
    }

    #[must_use]
    pub const fn kind(&self) -> CauseKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
