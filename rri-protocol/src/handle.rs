//! DENIC contact handles and contact types.

use crate::error::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// A contact handle like `DENIC-1000006-SOME-CODE`.
///
/// The default value is the empty handle, which stands for "unset" and
/// displays as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DenicHandle {
    reg_acc_id: u64,
    contact_code: String,
}

impl DenicHandle {
    /// Assembles a handle; the contact code is upper-cased.
    pub fn new(reg_acc_id: u64, contact_code: &str) -> Self {
        Self {
            reg_acc_id,
            contact_code: contact_code.to_uppercase(),
        }
    }

    /// Returns the empty handle.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true when the handle is unset.
    pub fn is_empty(&self) -> bool {
        self.reg_acc_id == 0 && self.contact_code.is_empty()
    }

    /// Returns the registrar account id.
    pub fn reg_acc_id(&self) -> u64 {
        self.reg_acc_id
    }

    /// Returns the contact code.
    pub fn contact_code(&self) -> &str {
        &self.contact_code
    }
}

impl fmt::Display for DenicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "DENIC-{}-{}", self.reg_acc_id, self.contact_code)
    }
}

impl FromStr for DenicHandle {
    type Err = ProtocolError;

    /// Parses a handle. An empty string yields the empty handle.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::empty());
        }

        let invalid = || ProtocolError::InvalidHandle(s.to_string());
        let mut parts = s.splitn(3, '-');
        let (prefix, id, code) = match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(id), Some(code)) => (prefix, id, code),
            _ => return Err(invalid()),
        };

        if !prefix.eq_ignore_ascii_case("DENIC") {
            return Err(invalid());
        }
        let reg_acc_id = id.parse::<u64>().map_err(|_| invalid())?;

        Ok(Self::new(reg_acc_id, code))
    }
}

/// The type of a contact handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactType {
    Person,
    Organisation,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Person => "PERSON",
            ContactType::Organisation => "ORG",
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PERSON" => Ok(ContactType::Person),
            "ORG" => Ok(ContactType::Organisation),
            _ => Err(ProtocolError::InvalidContactType(s.to_string())),
        }
    }
}
