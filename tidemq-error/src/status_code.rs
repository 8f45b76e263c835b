use std::fmt;

use num_enum::TryFromPrimitive;

/// Status codes used to categorize errors.
///
/// # Ranges:
/// - 1xxx: General errors
/// - 2xxx: Topic / subscription lookups
/// - 4xxx: Limits
/// - 5xxx: Delivery
/// - 6xxx: IO / channels
/// - 9xxx: Configuration and bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: General ===
    Internal = 1003,

    // === 2xxx: Topic / subscription ===
    NotFound = 2000,
    AlreadyExists = 2001,
    TopicNotFound = 2002,

    // === 4xxx: Limits ===
    RateLimited = 4000,

    // === 5xxx: Delivery ===
    DeliveryRejected = 5001,
    DeliveryTimeout = 5002,

    // === 6xxx: IO / channels ===
    Io = 6000,
    ChannelClosed = 6001,
    Timeout = 6002,
    UnexpectedEof = 6003,
    PermissionDenied = 6004,

    // === 9xxx: Configuration ===
    ConfigInvalid = 9000,
    ConfigLoadFailed = 9001,
    LoggingInitFailed = 9002,
}

impl StatusCode {
    /// Numeric representation of the status code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Returns `true` when retrying the failed operation can succeed without
    /// changing anything on the caller side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::DeliveryTimeout | Self::RateLimited
        )
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(StatusCode::Timeout.is_retryable());
        assert!(StatusCode::DeliveryTimeout.is_retryable());
        assert!(!StatusCode::DeliveryRejected.is_retryable());
        assert!(!StatusCode::TopicNotFound.is_retryable());
    }

    #[test]
    fn test_try_from_u32() {
        let n = StatusCode::TopicNotFound.code();
        assert_eq!(n, 2002);
        assert_eq!(StatusCode::try_from(n).unwrap(), StatusCode::TopicNotFound);
        assert!(StatusCode::try_from(99_999).is_err());
    }

    /// `Display` carries both the variant name and the numeric code.
    #[test]
    fn test_display_contains_name_and_code() {
        let s = format!("{}", StatusCode::TopicNotFound);
        assert!(s.contains("2002"), "got: {s}");
        assert!(s.contains("TopicNotFound"), "got: {s}");
    }
}
