//! RRI queries.

use crate::data::{put_domain_to_query_fields, ContactData, DomainData, PersonToVerify};
use crate::error::ProtocolError;
use crate::fields::{parse_kv, QueryFieldList};
use crate::handle::DenicHandle;
use crate::vocabulary::{Action, QueryFieldName};
use crate::LATEST_VERSION;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::fmt;

/// A named block of fields following the top-level fields of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub header: String,
    pub fields: QueryFieldList,
}

impl Section {
    pub fn new(header: impl Into<String>, fields: QueryFieldList) -> Self {
        Self {
            header: header.into(),
            fields,
        }
    }
}

/// An RRI request.
///
/// A query always carries exactly one `version` and one `action` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    fields: QueryFieldList,
    sections: Vec<Section>,
}

impl Query {
    /// Creates a query with version and action followed by the given fields.
    pub fn new(version: &str, action: impl Into<Action>, fields: QueryFieldList) -> Self {
        let mut all = QueryFieldList::new();
        all.push(QueryFieldName::Version, version);
        all.push(QueryFieldName::Action, action.into().normalize().as_str());
        fields.copy_to(&mut all);
        Self {
            fields: all,
            sections: Vec::new(),
        }
    }

    fn latest(action: Action, fields: QueryFieldList) -> Self {
        Self::new(LATEST_VERSION, action, fields)
    }

    fn with_domain(domain: &str) -> QueryFieldList {
        let mut fields = QueryFieldList::new();
        put_domain_to_query_fields(&mut fields, domain);
        fields
    }

    /// Appends a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Returns the protocol version.
    pub fn version(&self) -> &str {
        self.fields.first_value(QueryFieldName::Version)
    }

    /// Returns the normalized action.
    pub fn action(&self) -> Action {
        Action::parse(self.fields.first_value(QueryFieldName::Action))
    }

    pub fn fields(&self) -> &QueryFieldList {
        &self.fields
    }

    /// Returns all values of a field.
    pub fn field(&self, name: impl Into<QueryFieldName>) -> Vec<&str> {
        self.fields.values(name)
    }

    /// Returns the first value of a field, or an empty string.
    pub fn first_field(&self, name: impl Into<QueryFieldName>) -> &str {
        self.fields.first_value(name)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the key/value representation used on the wire.
    pub fn encode_kv(&self) -> String {
        let mut out = String::new();
        self.fields.write_kv(&mut out);
        for section in &self.sections {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push('[');
            out.push_str(&section.header);
            out.push(']');
            section.fields.write_kv(&mut out);
        }
        out
    }

    /// Parses a key/value encoded query.
    pub fn parse_kv(text: &str) -> Result<Self, ProtocolError> {
        let (fields, sections) = parse_kv::<QueryFieldName>(text)?;

        for name in [QueryFieldName::Version, QueryFieldName::Action] {
            match fields.values(&name).len() {
                0 => return Err(ProtocolError::MissingField(name.to_string())),
                1 => {}
                _ => return Err(ProtocolError::DuplicateField(name.to_string())),
            }
        }

        Ok(Self {
            fields,
            sections: sections
                .into_iter()
                .map(|(header, fields)| Section { header, fields })
                .collect(),
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn login(user: &str, password: &str) -> Self {
        let mut fields = QueryFieldList::new();
        fields.push(QueryFieldName::User, user);
        fields.push(QueryFieldName::Password, password);
        Self::latest(Action::Login, fields)
    }

    pub fn logout() -> Self {
        Self::latest(Action::Logout, QueryFieldList::new())
    }

    // =========================================================================
    // Contacts
    // =========================================================================

    pub fn create_contact(handle: &DenicHandle, contact: &ContactData) -> Self {
        let mut fields = QueryFieldList::new();
        fields.push(QueryFieldName::Handle, handle.to_string());
        contact.put_to_query_fields(&mut fields);
        Self::latest(Action::Create, fields)
    }

    pub fn check_handle(handle: &DenicHandle) -> Self {
        let mut fields = QueryFieldList::new();
        fields.push(QueryFieldName::Handle, handle.to_string());
        Self::latest(Action::Check, fields)
    }

    pub fn info_handle(handle: &DenicHandle) -> Self {
        let mut fields = QueryFieldList::new();
        fields.push(QueryFieldName::Handle, handle.to_string());
        Self::latest(Action::Info, fields)
    }

    // =========================================================================
    // Domains
    // =========================================================================

    pub fn create_domain(domain: &str, data: &DomainData) -> Self {
        let mut fields = Self::with_domain(domain);
        data.put_to_query_fields(&mut fields);
        Self::latest(Action::Create, fields)
    }

    pub fn check_domain(domain: &str) -> Self {
        Self::latest(Action::Check, Self::with_domain(domain))
    }

    pub fn info_domain(domain: &str) -> Self {
        Self::latest(Action::Info, Self::with_domain(domain))
    }

    pub fn update_domain(domain: &str, data: &DomainData) -> Self {
        let mut fields = Self::with_domain(domain);
        data.put_to_query_fields(&mut fields);
        Self::latest(Action::Update, fields)
    }

    pub fn change_holder(domain: &str, data: &DomainData) -> Self {
        let mut fields = Self::with_domain(domain);
        data.put_to_query_fields(&mut fields);
        Self::latest(Action::ChangeHolder, fields)
    }

    pub fn delete_domain(domain: &str) -> Self {
        Self::latest(Action::Delete, Self::with_domain(domain))
    }

    pub fn restore_domain(domain: &str) -> Self {
        Self::latest(Action::Restore, Self::with_domain(domain))
    }

    /// Transits a domain to DENIC, optionally disconnecting it.
    pub fn transit_domain(domain: &str, disconnect: bool) -> Self {
        let mut fields = Self::with_domain(domain);
        fields.push(
            QueryFieldName::Disconnect,
            if disconnect { "true" } else { "false" },
        );
        Self::latest(Action::Transit, fields)
    }

    /// Registers an AuthInfo for a provider change.
    ///
    /// Only the SHA-256 hash of `auth_info` is transmitted.
    pub fn create_authinfo1(domain: &str, auth_info: &str, expire: NaiveDate) -> Self {
        let mut fields = Self::with_domain(domain);
        fields.push(QueryFieldName::AuthInfoHash, hash_auth_info(auth_info));
        fields.push(
            QueryFieldName::AuthInfoExpire,
            expire.format("%Y%m%d").to_string(),
        );
        Self::latest(Action::CreateAuthInfo1, fields)
    }

    pub fn create_authinfo2(domain: &str) -> Self {
        Self::latest(Action::CreateAuthInfo2, Self::with_domain(domain))
    }

    pub fn change_provider(domain: &str, auth_info: &str, data: &DomainData) -> Self {
        let mut fields = Self::with_domain(domain);
        data.put_to_query_fields(&mut fields);
        fields.push(QueryFieldName::AuthInfo, auth_info);
        Self::latest(Action::ChangeProvider, fields)
    }

    // =========================================================================
    // Message queue
    // =========================================================================

    pub fn queue_read(msg_type: Option<&str>) -> Self {
        let mut fields = QueryFieldList::new();
        if let Some(msg_type) = msg_type {
            fields.push(QueryFieldName::MsgType, msg_type);
        }
        Self::latest(Action::QueueRead, fields)
    }

    pub fn queue_delete(msg_id: &str, msg_type: Option<&str>) -> Self {
        let mut fields = QueryFieldList::new();
        fields.push(QueryFieldName::MsgId, msg_id);
        if let Some(msg_type) = msg_type {
            fields.push(QueryFieldName::MsgType, msg_type);
        }
        Self::latest(Action::QueueDelete, fields)
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Requests verification of a domain held by a legal entity.
    pub fn verify_legal_entity(
        domain: &str,
        sso_email: &str,
        signatory: &PersonToVerify,
        business_number: &str,
    ) -> Self {
        let mut fields = Self::with_domain(domain);
        fields.push(QueryFieldName::AuthSigFirstName, signatory.first_name.as_str());
        fields.push(QueryFieldName::AuthSigLastName, signatory.last_name.as_str());
        fields.push(QueryFieldName::AuthSigEmail, signatory.email.as_str());
        fields.push(
            QueryFieldName::AuthSigDateOfBirth,
            signatory.date_of_birth.format("%Y-%m-%d").to_string(),
        );
        fields.push(QueryFieldName::AuthSigCountryCode, signatory.country_code.as_str());
        fields.push(QueryFieldName::AuthSigCity, signatory.city.as_str());
        fields.push(QueryFieldName::AuthSigPostalCode, signatory.postal_code.as_str());
        fields.push(QueryFieldName::AuthSigStreet, signatory.street.as_str());
        if !signatory.phone.is_empty() {
            fields.push(QueryFieldName::AuthSigPhone, signatory.phone.as_str());
        }
        if !sso_email.is_empty() {
            fields.push(QueryFieldName::SsoEmail, sso_email);
        }
        if !business_number.is_empty() {
            fields.push(QueryFieldName::BusinessNumber, business_number);
        }
        Self::latest(Action::VerifyLegalEntity, fields)
    }

    /// Requests verification of a domain held by a natural person.
    pub fn verify_natural_person(domain: &str, sso_email: &str, person: &PersonToVerify) -> Self {
        let mut fields = Self::with_domain(domain);
        fields.push(QueryFieldName::PersonFirstName, person.first_name.as_str());
        fields.push(QueryFieldName::PersonLastName, person.last_name.as_str());
        fields.push(QueryFieldName::PersonEmail, person.email.as_str());
        fields.push(
            QueryFieldName::PersonDateOfBirth,
            person.date_of_birth.format("%Y-%m-%d").to_string(),
        );
        fields.push(QueryFieldName::PersonCountryCode, person.country_code.as_str());
        fields.push(QueryFieldName::PersonCity, person.city.as_str());
        fields.push(QueryFieldName::PersonPostalCode, person.postal_code.as_str());
        fields.push(QueryFieldName::PersonStreet, person.street.as_str());
        if !person.phone.is_empty() {
            fields.push(QueryFieldName::PersonPhone, person.phone.as_str());
        }
        if !sso_email.is_empty() {
            fields.push(QueryFieldName::SsoEmail, sso_email);
        }
        Self::latest(Action::VerifyNaturalPerson, fields)
    }

    pub fn verify_queue_read() -> Self {
        Self::latest(Action::VerifyQueueRead, QueryFieldList::new())
    }

    pub fn verify_queue_delete(msg_id: &str) -> Self {
        let mut fields = QueryFieldList::new();
        fields.push(QueryFieldName::MsgId, msg_id);
        Self::latest(Action::VerifyQueueDelete, fields)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = self.action();
        match action {
            Action::Login => write!(f, "{}{{{:?}}}", action, self.first_field(QueryFieldName::User)),
            _ => write!(f, "{}{{}}", action),
        }
    }
}

fn hash_auth_info(auth_info: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(auth_info.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns true if the payload is XML encoded.
pub(crate) fn is_xml(text: &str) -> bool {
    text.trim_start().starts_with('<')
}

/// Detects the encoding of a query and parses it.
///
/// Only the key/value encoding is supported.
pub fn parse_query(text: &str) -> Result<Query, ProtocolError> {
    if is_xml(text) {
        return Err(ProtocolError::Unsupported("XML queries"));
    }
    Query::parse_kv(text)
}
