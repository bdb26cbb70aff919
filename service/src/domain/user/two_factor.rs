//! Second factor definitions of a [`User`].

use derive_more::{AsRef, Display, FromStr};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use totp_rs::{Algorithm, TotpUrlError, TOTP};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user::Email;

/// Issuer advertised in [`EnrollmentUri`]s.
const ISSUER: &str = "Freelancer";

/// Number of digits in a one-time [`Code`].
const DIGITS: usize = 6;

/// Time step of one-time [`Code`] generation, in seconds.
const PERIOD: u64 = 30;

/// Number of adjacent time steps a one-time [`Code`] is still accepted from,
/// tolerating client clock drift.
const SKEW: u8 = 1;

/// Builds a [`TOTP`] verifier upon the given [`Secret`], labeled with the
/// given [`Email`].
///
/// # Errors
///
/// If the parameters cannot be represented as an `otpauth://` URI.
pub fn totp(secret: &Secret, email: &Email) -> Result<TOTP, TotpUrlError> {
    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        PERIOD,
        secret.to_bytes(),
        Some(ISSUER.into()),
        email.to_string(),
    )
}

/// Shared secret generating one-time [`Code`]s of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Secret(String);

impl Secret {
    /// Generates a new random [`Secret`].
    #[must_use]
    pub fn generate() -> Self {
        Self(totp_rs::Secret::generate_secret().to_encoded().to_string())
    }

    /// Creates a new [`Secret`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `secret` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Creates a new [`Secret`] if the given `secret` is valid.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        Self::check(&secret).then_some(Self(secret))
    }

    /// Checks whether the given `secret` is a valid base32 [`Secret`].
    fn check(secret: impl AsRef<str>) -> bool {
        let secret = secret.as_ref();
        !secret.is_empty()
            && secret.bytes().all(|b| matches!(b, b'A'..=b'Z' | b'2'..=b'7'))
    }

    /// Returns the raw bytes this [`Secret`] encodes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        totp_rs::Secret::Encoded(self.0.clone())
            .to_bytes()
            .unwrap_or_default()
    }
}

impl FromStr for Secret {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Secret`")
    }
}

/// One-time code confirming possession of a [`Secret`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Code(String);

impl Code {
    /// Creates a new [`Code`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `code` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Creates a new [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        code.len() == DIGITS && code.bytes().all(|b| b.is_ascii_digit())
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// `otpauth://` URI for enrolling a [`Secret`] into an authenticator app.
#[derive(AsRef, Clone, Debug, Display)]
pub struct EnrollmentUri(String);

impl From<&TOTP> for EnrollmentUri {
    fn from(totp: &TOTP) -> Self {
        Self(totp.get_url())
    }
}

#[cfg(test)]
mod spec {
    use super::{totp, Code, Email, Secret};

    #[test]
    fn generated_secret_is_base32() {
        let secret = Secret::generate();

        assert!(Secret::new(secret.to_string()).is_some());
        assert!(!secret.to_bytes().is_empty());
    }

    #[test]
    fn code_requires_six_digits() {
        assert!(Code::new("012345").is_some());
        for wrong in ["", "12345", "1234567", "12345a", "12 456"] {
            assert!(Code::new(wrong).is_none(), "accepted `{wrong}`");
        }
    }

    #[test]
    fn enrollment_uri_carries_issuer_and_account() {
        let email = Email::new("user@example.com").unwrap();
        let totp = totp(&Secret::generate(), &email).unwrap();

        let uri = totp.get_url();
        assert!(uri.starts_with("otpauth://totp/"), "bad scheme: {uri}");
        assert!(uri.contains("Freelancer"), "no issuer: {uri}");
        assert!(uri.contains("user%40example.com"), "no account: {uri}");
    }
}
