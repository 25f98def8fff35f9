//! Domain and contact data carried by queries.

use crate::fields::QueryFieldList;
use crate::handle::{ContactType, DenicHandle};
use crate::vocabulary::QueryFieldName;
use chrono::NaiveDate;

/// Adds both the unicode and the ACE form of a domain name.
///
/// Input starting with `xn--` is treated as ACE. The alternate form is
/// computed on a best-effort basis and omitted if the conversion fails.
pub fn put_domain_to_query_fields(fields: &mut QueryFieldList, domain: &str) {
    if domain.to_lowercase().starts_with("xn--") {
        fields.push(QueryFieldName::DomainAce, domain);
        match idna::domain_to_unicode(domain) {
            (unicode, Ok(())) => fields.push(QueryFieldName::Domain, unicode),
            (_, Err(err)) => {
                tracing::debug!(domain, error = ?err, "Failed to convert ACE domain to unicode")
            }
        }
    } else {
        fields.push(QueryFieldName::Domain, domain);
        match idna::domain_to_ascii(domain) {
            Ok(ace) => fields.push(QueryFieldName::DomainAce, ace),
            Err(err) => {
                tracing::debug!(domain, error = ?err, "Failed to convert domain to ACE")
            }
        }
    }
}

/// Contacts and name servers of a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainData {
    pub holder_handles: Vec<DenicHandle>,
    pub general_request_handles: Vec<DenicHandle>,
    pub abuse_contact_handles: Vec<DenicHandle>,
    pub name_servers: Vec<String>,
}

impl DomainData {
    pub(crate) fn put_to_query_fields(&self, fields: &mut QueryFieldList) {
        let mut put_handles = |name: QueryFieldName, handles: &[DenicHandle]| {
            for handle in handles.iter().filter(|h| !h.is_empty()) {
                fields.push(name.clone(), handle.to_string());
            }
        };
        put_handles(QueryFieldName::Holder, &self.holder_handles);
        put_handles(QueryFieldName::GeneralRequest, &self.general_request_handles);
        put_handles(QueryFieldName::AbuseContact, &self.abuse_contact_handles);
        fields.add(QueryFieldName::NameServer, self.name_servers.iter().cloned());
    }
}

/// Data of a contact handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactData {
    pub contact_type: ContactType,
    pub name: String,
    /// May span multiple lines; each line becomes its own field.
    pub organisation: String,
    /// May span multiple lines; each line becomes its own field.
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country_code: String,
    pub email: Vec<String>,
}

impl ContactData {
    pub(crate) fn put_to_query_fields(&self, fields: &mut QueryFieldList) {
        fields.push(QueryFieldName::Type, self.contact_type.as_str());
        fields.push(QueryFieldName::Name, self.name.as_str());
        fields.add(QueryFieldName::Organisation, split_lines(&self.organisation));
        fields.add(QueryFieldName::Address, split_lines(&self.address));
        fields.push(QueryFieldName::PostalCode, self.postal_code.as_str());
        fields.push(QueryFieldName::City, self.city.as_str());
        fields.push(QueryFieldName::CountryCode, self.country_code.as_str());
        fields.add(QueryFieldName::Email, self.email.iter().cloned());
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(String::from)
        .collect()
}

/// A natural person to be verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonToVerify {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub country_code: String,
    pub city: String,
    pub postal_code: String,
    pub street: String,
    /// Omitted from the query when empty.
    pub phone: String,
}
