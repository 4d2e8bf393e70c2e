//! Envelope address type.

use crate::error::{Error, Result};

/// Email address as used in `MAIL FROM`, `RCPT TO` and the message headers.
///
/// Construction is the only place addresses are checked, so anything that
/// holds an `Address` can be written onto the wire without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address is malformed.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address can travel without the SMTPUTF8 extension.
    #[must_use]
    pub fn is_ascii(&self) -> bool {
        self.0.is_ascii()
    }

    /// Returns the part after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::invalid_address(addr, "address cannot be empty"));
        }

        let Some((local, domain)) = addr.split_once('@') else {
            return Err(Error::invalid_address(
                addr,
                "address must contain exactly one @",
            ));
        };
        if domain.contains('@') {
            return Err(Error::invalid_address(
                addr,
                "address must contain exactly one @",
            ));
        }
        if local.is_empty() || domain.is_empty() {
            return Err(Error::invalid_address(
                addr,
                "local and domain parts cannot be empty",
            ));
        }

        // These would break out of the <...> framing of MAIL FROM / RCPT TO.
        if addr
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '<' || c == '>')
        {
            return Err(Error::invalid_address(
                addr,
                "address contains whitespace, control characters or angle brackets",
            ));
        }

        Ok(())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
