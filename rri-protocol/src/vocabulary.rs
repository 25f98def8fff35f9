//! Action and field-name vocabulary of the RRI protocol.
//!
//! Every vocabulary type is a closed enum of the names this crate knows,
//! plus an `Other` variant carrying any other name in normalized spelling.
//! Registries extend the protocol over time, so unknown names must survive
//! a parse/encode cycle unchanged.

use crate::fields::FieldName;
use std::fmt;

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident normalized by $norm:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// A name outside the known vocabulary.
            Other(String),
        }

        impl $name {
            /// Parses a name, normalizing its case.
            pub fn parse(name: &str) -> Self {
                let normalized = name.$norm();
                match normalized.as_str() {
                    $( $text => $name::$variant, )*
                    _ => $name::Other(normalized),
                }
            }

            /// Returns the wire spelling.
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $text, )*
                    $name::Other(name) => name.as_str(),
                }
            }

            /// Returns the canonical form of this value.
            pub fn normalize(self) -> Self {
                match self {
                    $name::Other(name) => Self::parse(&name),
                    known => known,
                }
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::parse(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self::parse(&name)
            }
        }

        impl From<&$name> for $name {
            fn from(name: &$name) -> Self {
                name.clone()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// The action of a query. Normalized to upper case.
    pub enum Action normalized by to_uppercase {
        Login => "LOGIN",
        Logout => "LOGOUT",
        Check => "CHECK",
        Info => "INFO",
        Create => "CREATE",
        Update => "UPDATE",
        ChangeHolder => "CHHOLDER",
        Delete => "DELETE",
        Restore => "RESTORE",
        Transit => "TRANSIT",
        CreateAuthInfo1 => "CREATE-AUTHINFO1",
        CreateAuthInfo2 => "CREATE-AUTHINFO2",
        ChangeProvider => "CHPROV",
        QueueRead => "QUEUE-READ",
        QueueDelete => "QUEUE-DELETE",
        VerifyLegalEntity => "VERIFY-LEGAL-ENTITY",
        VerifyNaturalPerson => "VERIFY-NATURAL-PERSON",
        VerifyQueueRead => "VERIFY-QUEUE-READ",
        VerifyQueueDelete => "VERIFY-QUEUE-DELETE",
    }
}

vocabulary! {
    /// The name of a query field. Normalized to lower case.
    pub enum QueryFieldName normalized by to_lowercase {
        Version => "version",
        Action => "action",
        User => "user",
        Password => "password",
        /// The unicode form of a domain name.
        Domain => "domain",
        /// The ASCII compatible (punycode) form of a domain name.
        DomainAce => "domain-ace",
        Holder => "holder",
        GeneralRequest => "generalrequest",
        AbuseContact => "abusecontact",
        NameServer => "nserver",
        Handle => "handle",
        Disconnect => "disconnect",
        AuthInfoHash => "authinfohash",
        AuthInfoExpire => "authinfoexpire",
        AuthInfo => "authinfo",
        MsgId => "msgid",
        MsgType => "msgtype",
        Type => "type",
        Name => "name",
        Organisation => "organisation",
        Address => "address",
        PostalCode => "postalcode",
        City => "city",
        CountryCode => "countrycode",
        Email => "email",
        SsoEmail => "ssoemail",
        BusinessNumber => "businessnumber",
        AuthSigFirstName => "authorizedsignatoryfirstname",
        AuthSigLastName => "authorizedsignatorylastname",
        AuthSigEmail => "authorizedsignatoryemail",
        AuthSigDateOfBirth => "authorizedsignatorydateofbirth",
        AuthSigCountryCode => "authorizedsignatorycountrycode",
        AuthSigCity => "authorizedsignatorycity",
        AuthSigPostalCode => "authorizedsignatorypostalcode",
        AuthSigStreet => "authorizedsignatorystreet",
        AuthSigPhone => "authorizedsignatoryphone",
        PersonFirstName => "personfirstname",
        PersonLastName => "personlastname",
        PersonEmail => "personemail",
        PersonDateOfBirth => "persondateofbirth",
        PersonCountryCode => "personcountrycode",
        PersonCity => "personcity",
        PersonPostalCode => "personpostalcode",
        PersonStreet => "personstreet",
        PersonPhone => "personphone",
        VerifiedClaim => "verifiedclaim",
        VerificationResult => "verificationresult",
        VerificationReference => "verificationreference",
        VerificationTimestamp => "verificationtimestamp",
        VerificationEvidence => "verificationevidence",
        VerificationMethod => "verificationmethod",
        TrustFramework => "trustframework",
    }
}

vocabulary! {
    /// The name of a response field. Normalized to upper case.
    pub enum ResponseFieldName normalized by to_uppercase {
        Result => "RESULT",
        Stid => "STID",
        Info => "INFO",
        Error => "ERROR",
        Warning => "WARNING",
    }
}

vocabulary! {
    /// The result of a response. Normalized to lower case.
    pub enum ResultCode normalized by to_lowercase {
        Success => "success",
        Failure => "failure",
    }
}

impl FieldName for QueryFieldName {
    fn normalize(self) -> Self {
        QueryFieldName::normalize(self)
    }

    fn as_str(&self) -> &str {
        QueryFieldName::as_str(self)
    }
}

impl FieldName for ResponseFieldName {
    fn normalize(self) -> Self {
        ResponseFieldName::normalize(self)
    }

    fn as_str(&self) -> &str {
        ResponseFieldName::as_str(self)
    }
}

impl From<QueryFieldName> for ResponseFieldName {
    fn from(name: QueryFieldName) -> Self {
        ResponseFieldName::parse(name.as_str())
    }
}
