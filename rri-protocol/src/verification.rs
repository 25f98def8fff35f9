//! Verification information exchanged with the registry.
//!
//! Queries carry it as a `[VerificationInformation]` section; responses
//! return it as `verificationinformation` entities.

use crate::error::ProtocolError;
use crate::fields::QueryFieldList;
use crate::query::Section;
use crate::response::Entity;
use crate::vocabulary::{QueryFieldName, ResponseFieldName};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::fmt;
use std::str::FromStr;

/// Section header used in queries.
pub const SECTION_VERIFICATION_INFORMATION: &str = "VerificationInformation";

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $field:literal {
            $( $variant:ident => $text:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )*
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ProtocolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $( $text => Ok($name::$variant), )*
                    _ => Err(ProtocolError::InvalidVerification {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Outcome of a verification.
    pub enum VerificationResult as "verification result" {
        Success => "success",
        Failed => "failed",
    }
}

string_enum! {
    /// A verified property of a contact.
    pub enum VerificationClaim as "verification claim" {
        Email => "email",
        Name => "name",
        Address => "address",
    }
}

string_enum! {
    pub enum VerificationMethod as "verification method" {
        Auth => "auth",
        ElectronicDocument => "electronic_document",
        PhysicalDocument => "physical_document",
        Vdig => "vdig",
        Bvr => "bvr",
        Pvr => "pvr",
        Data => "data",
        Reachability => "reachability",
    }
}

string_enum! {
    pub enum VerificationEvidence as "verification evidence" {
        IdCard => "idcard",
        Passport => "passport",
        PopulationRegister => "population_register",
        ResidencePermit => "residence_permit",
        ProofOfArrival => "proof_of_arrival",
        DriversLicence => "drivers_licence",
        CompanyRegister => "company_register",
        CompanyStatement => "company_statement",
        BankAccount => "bank_account",
        OnlinePaymentAccount => "online_payment_account",
        UtilityAccount => "utility_account",
        BankStatement => "bank_statement",
        TaxStatement => "tax_statement",
        WrittenAttestation => "written_attestation",
        DigitalAttestation => "digital_attestation",
        PostalVerTransactionLog => "postal_ver_transaction_log",
        EmailVerTransactionLog => "email_ver_transaction_log",
        AddressDatabase => "address_database",
    }
}

string_enum! {
    pub enum TrustFramework as "trust framework" {
        Denic => "de_denic",
    }
}

/// The result of verifying a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationInformation {
    pub timestamp: DateTime<FixedOffset>,
    pub result: VerificationResult,
    pub reference: String,
    pub evidence: VerificationEvidence,
    pub method: VerificationMethod,
    pub trust_framework: TrustFramework,
    pub verified_claims: Vec<VerificationClaim>,
}

impl VerificationInformation {
    /// Renders the information as a query section.
    pub fn to_section(&self) -> Section {
        let mut fields = QueryFieldList::new();
        fields.add(
            QueryFieldName::VerifiedClaim,
            self.verified_claims.iter().map(|c| c.as_str()),
        );
        fields.push(QueryFieldName::VerificationResult, self.result.as_str());
        fields.push(QueryFieldName::VerificationReference, self.reference.as_str());
        fields.push(
            QueryFieldName::VerificationTimestamp,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
        );
        fields.push(QueryFieldName::VerificationEvidence, self.evidence.as_str());
        fields.push(QueryFieldName::VerificationMethod, self.method.as_str());
        fields.push(QueryFieldName::TrustFramework, self.trust_framework.as_str());
        Section::new(SECTION_VERIFICATION_INFORMATION, fields)
    }

    /// Reads the information from a response entity.
    pub fn from_entity(entity: &Entity) -> Result<Self, ProtocolError> {
        fn first(entity: &Entity, name: QueryFieldName) -> &str {
            entity.first_field(ResponseFieldName::from(name))
        }

        let verified_claims = entity
            .field(ResponseFieldName::from(QueryFieldName::VerifiedClaim))
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<VerificationClaim>, _>>()?;

        let raw_timestamp = first(entity, QueryFieldName::VerificationTimestamp);
        let timestamp = DateTime::parse_from_rfc3339(raw_timestamp).map_err(|_| {
            ProtocolError::InvalidVerification {
                field: "verification timestamp",
                value: raw_timestamp.to_string(),
            }
        })?;

        Ok(Self {
            timestamp,
            result: first(entity, QueryFieldName::VerificationResult).parse()?,
            reference: first(entity, QueryFieldName::VerificationReference).to_string(),
            evidence: first(entity, QueryFieldName::VerificationEvidence).parse()?,
            method: first(entity, QueryFieldName::VerificationMethod).parse()?,
            trust_framework: first(entity, QueryFieldName::TrustFramework).parse()?,
            verified_claims,
        })
    }
}
