//! Ordered, multi-valued field lists.
//!
//! A [`FieldList`] keeps every entry in insertion order and allows the same
//! name to appear multiple times (e.g. several name servers). Names are
//! normalized on insertion and on lookup, values keep their original case.

use crate::error::ProtocolError;
use crate::vocabulary::{QueryFieldName, ResponseFieldName};
use std::fmt;

/// A field name with a canonical spelling.
pub trait FieldName: Clone + Eq + fmt::Display {
    /// Returns the canonical form of this name.
    fn normalize(self) -> Self;

    /// Returns the wire spelling.
    fn as_str(&self) -> &str;
}

/// A single name/value entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<N> {
    pub name: N,
    pub value: String,
}

impl<N: FieldName> fmt::Display for Field<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name.as_str(), self.value)
    }
}

/// An ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList<N> {
    entries: Vec<Field<N>>,
}

/// Fields of a query; names are lower case.
pub type QueryFieldList = FieldList<QueryFieldName>;

/// Fields of a response; names are upper case.
pub type ResponseFieldList = FieldList<ResponseFieldName>;

impl<N: FieldName> FieldList<N> {
    /// Creates an empty field list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends one entry per value, in order.
    pub fn add<I, V>(&mut self, name: impl Into<N>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let name = name.into().normalize();
        for value in values {
            self.entries.push(Field {
                name: name.clone(),
                value: value.into(),
            });
        }
    }

    /// Appends a single entry.
    pub fn push(&mut self, name: impl Into<N>, value: impl Into<String>) {
        self.add(name, std::iter::once(value));
    }

    /// Removes every entry with the given name.
    pub fn remove_all(&mut self, name: impl Into<N>) {
        let name = name.into().normalize();
        self.entries.retain(|field| field.name != name);
    }

    /// Returns all values of the given name in insertion order.
    pub fn values(&self, name: impl Into<N>) -> Vec<&str> {
        let name = name.into().normalize();
        self.entries
            .iter()
            .filter(|field| field.name == name)
            .map(|field| field.value.as_str())
            .collect()
    }

    /// Returns the first value of the given name, or an empty string.
    pub fn first_value(&self, name: impl Into<N>) -> &str {
        let name = name.into().normalize();
        self.entries
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }

    /// Returns true if at least one entry has the given name.
    pub fn contains(&self, name: impl Into<N>) -> bool {
        let name = name.into().normalize();
        self.entries.iter().any(|field| field.name == name)
    }

    /// Appends all entries of this list to `other`.
    pub fn copy_to(&self, other: &mut FieldList<N>) {
        other.entries.extend(self.entries.iter().cloned());
    }

    /// Returns the total number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field<N>> {
        self.entries.iter()
    }

    /// Writes every entry as a `name: value` line, separated by `\n`.
    pub(crate) fn write_kv(&self, out: &mut String) {
        for field in &self.entries {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&field.to_string());
        }
    }
}

impl<N: FieldName> Default for FieldList<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, N> IntoIterator for &'a FieldList<N> {
    type Item = &'a Field<N>;
    type IntoIter = std::slice::Iter<'a, Field<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Top-level fields and named sections of a key/value message.
pub(crate) type ParsedKv<N> = (FieldList<N>, Vec<(String, FieldList<N>)>);

/// Splits a key/value message into top-level fields and `[name]` sections.
///
/// Lines are trimmed and empty lines skipped. Every other line must either
/// be a section marker or contain a `:` separating key and value.
pub(crate) fn parse_kv<N>(text: &str) -> Result<ParsedKv<N>, ProtocolError>
where
    N: FieldName + for<'a> From<&'a str>,
{
    let mut fields = FieldList::new();
    let mut sections: Vec<(String, FieldList<N>)> = Vec::new();

    for (index, line) in text.split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                sections.push((header.trim().to_string(), FieldList::new()));
                continue;
            }
            return Err(ProtocolError::MalformedLine {
                index,
                line: line.to_string(),
            });
        };

        let target = match sections.last_mut() {
            Some((_, section)) => section,
            None => &mut fields,
        };
        target.push(N::from(key.trim()), value.trim());
    }

    Ok((fields, sections))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_field_list() {
        let mut list = QueryFieldList::new();
        assert_eq!(list.len(), 0);
        assert!(list.values(QueryFieldName::Domain).is_empty());
        assert_eq!(list.first_value(QueryFieldName::Domain), "");

        list.push(QueryFieldName::Domain, "denic.de");
        assert_eq!(list.len(), 1);
        assert_eq!(list.values(QueryFieldName::Domain), vec!["denic.de"]);
        assert_eq!(list.first_value(QueryFieldName::Domain), "denic.de");

        list.add(QueryFieldName::Domain, Vec::<String>::new());
        assert_eq!(list.len(), 1);

        list.add(QueryFieldName::NameServer, ["ns1.denic.de", "ns2.denic.de"]);
        assert_eq!(list.len(), 3);
        assert_eq!(
            list.values(QueryFieldName::NameServer),
            vec!["ns1.denic.de", "ns2.denic.de"]
        );
        assert_eq!(list.first_value(QueryFieldName::NameServer), "ns1.denic.de");

        list.add("dOmAiN", ["some-other", "stuff"]);
        assert_eq!(list.len(), 5);
        assert_eq!(
            list.values("DoMaIn"),
            vec!["denic.de", "some-other", "stuff"]
        );
        assert_eq!(list.first_value("DoMaIn"), "denic.de");

        list.remove_all(QueryFieldName::NameServer);
        assert_eq!(list.len(), 3);
        assert!(list.values(QueryFieldName::NameServer).is_empty());
        assert_eq!(list.first_value(QueryFieldName::NameServer), "");
        assert_eq!(
            list.values(QueryFieldName::Domain),
            vec!["denic.de", "some-other", "stuff"]
        );
    }

    #[test]
    fn test_response_field_list() {
        let mut list = ResponseFieldList::new();
        list.push(ResponseFieldName::Error, "foobar");
        list.add(ResponseFieldName::Info, ["foo", "bar"]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.values("info"), vec!["foo", "bar"]);
        assert_eq!(list.first_value("Error"), "foobar");

        list.remove_all("INFO");
        assert_eq!(list.len(), 1);
        assert!(!list.contains(ResponseFieldName::Info));
        assert!(list.contains(ResponseFieldName::Error));
    }

    #[test]
    fn test_values_keep_case() {
        let mut list = QueryFieldList::new();
        list.push("Domain", "Denic.DE");
        assert_eq!(list.values("dOmAiN"), vec!["Denic.DE"]);
        assert_eq!(list.iter().next().unwrap().name, QueryFieldName::Domain);
    }

    #[test]
    fn test_copy_to() {
        let mut src = QueryFieldList::new();
        src.push(QueryFieldName::Action, "LOGIN");
        src.push(QueryFieldName::User, "test");

        let mut dst = QueryFieldList::new();
        dst.push(QueryFieldName::Version, "5.0");
        src.copy_to(&mut dst);

        assert_eq!(dst.len(), 3);
        assert_eq!(dst.values(QueryFieldName::Action), vec!["LOGIN"]);
        assert_eq!(dst.values(QueryFieldName::User), vec!["test"]);
        assert_eq!(src.len(), 2);
    }

    #[test]
    fn test_write_kv() {
        let mut list = QueryFieldList::new();
        list.push("Address", "foo");
        list.push("domain", "denic.de");
        let mut out = String::new();
        list.write_kv(&mut out);
        assert_eq!(out, "address: foo\ndomain: denic.de");
    }

    #[test]
    fn test_parse_kv_sections() {
        let (fields, sections) =
            parse_kv::<ResponseFieldName>("RESULT: success\n\n[Holder]\nHandle: DENIC-1-A\n")
                .unwrap();
        assert_eq!(fields.values("result"), vec!["success"]);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "Holder");
        assert_eq!(sections[0].1.values("handle"), vec!["DENIC-1-A"]);
    }

    #[test]
    fn test_parse_kv_malformed_line() {
        let err = parse_kv::<QueryFieldName>("version: 5.0\n\nno colon here").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedLine { index: 2, .. }));
    }

    #[test]
    fn test_parse_kv_value_with_colon() {
        let (fields, _) = parse_kv::<QueryFieldName>("nserver: ns1.denic.de 2001:db8::1").unwrap();
        assert_eq!(fields.values("nserver"), vec!["ns1.denic.de 2001:db8::1"]);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn values_preserve_insertion_order(values in prop::collection::vec("[a-z0-9.]{0,12}", 0..16)) {
                let mut list = QueryFieldList::new();
                list.add("nserver", values.iter().cloned());
                list.push("domain", "denic.de");
                let got: Vec<String> = list.values("NSERVER").into_iter().map(String::from).collect();
                prop_assert_eq!(got, values.clone());
                prop_assert_eq!(list.len(), values.len() + 1);
            }
        }
    }
}
