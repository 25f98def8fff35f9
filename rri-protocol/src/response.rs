//! RRI responses.

use crate::error::ProtocolError;
use crate::fields::{parse_kv, ResponseFieldList};
use crate::query::is_xml;
use crate::verification::VerificationInformation;
use crate::vocabulary::{ResponseFieldName, ResultCode};
use std::fmt;

/// Entity name of a domain holder.
pub const ENTITY_HOLDER: &str = "holder";

/// Entity name of a verification information block.
pub const ENTITY_VERIFICATION_INFORMATION: &str = "verificationinformation";

/// A numbered message attached to a response, e.g. `13000000011 Request was processed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessMessage {
    pub id: i64,
    pub text: String,
}

impl BusinessMessage {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Parses a message of the form `<id> <text>`.
    pub fn parse(value: &str) -> Result<Self, ProtocolError> {
        let invalid = |reason: &'static str| ProtocolError::InvalidBusinessMessage {
            value: value.to_string(),
            reason,
        };
        let (id, text) = value
            .split_once(' ')
            .ok_or_else(|| invalid("missing id or message part"))?;
        if text.is_empty() {
            return Err(invalid("missing message part"));
        }
        let id = id.parse::<i64>().map_err(|_| invalid("id is not numeric"))?;
        Ok(Self::new(id, text))
    }
}

impl fmt::Display for BusinessMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.text)
    }
}

/// A named, repeatable block of response fields, e.g. a holder contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    name: String,
    fields: ResponseFieldList,
}

impl Entity {
    /// Creates an entity; the name is lower-cased.
    pub fn new(name: &str, fields: ResponseFieldList) -> Self {
        Self {
            name: name.to_lowercase(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &ResponseFieldList {
        &self.fields
    }

    pub fn field(&self, name: impl Into<ResponseFieldName>) -> Vec<&str> {
        self.fields.values(name)
    }

    pub fn first_field(&self, name: impl Into<ResponseFieldName>) -> &str {
        self.fields.first_value(name)
    }
}

/// An RRI response.
///
/// A response carries exactly one `RESULT` and at most one `STID` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    fields: ResponseFieldList,
    entities: Vec<Entity>,
}

impl Response {
    /// Creates a response with the given result followed by the given fields.
    pub fn new(result: ResultCode, fields: ResponseFieldList) -> Self {
        let mut all = ResponseFieldList::new();
        all.push(ResponseFieldName::Result, result.normalize().as_str());
        fields.copy_to(&mut all);
        Self {
            fields: all,
            entities: Vec::new(),
        }
    }

    pub fn success() -> Self {
        Self::new(ResultCode::Success, ResponseFieldList::new())
    }

    pub fn failure() -> Self {
        Self::new(ResultCode::Failure, ResponseFieldList::new())
    }

    /// Creates a response with attached info messages.
    pub fn new_with_info(
        result: ResultCode,
        fields: ResponseFieldList,
        infos: &[BusinessMessage],
    ) -> Self {
        let mut response = Self::new(result, fields);
        response
            .fields
            .add(ResponseFieldName::Info, infos.iter().map(|m| m.to_string()));
        response
    }

    /// Creates a response with attached error messages.
    pub fn new_with_error(
        result: ResultCode,
        fields: ResponseFieldList,
        errors: &[BusinessMessage],
    ) -> Self {
        let mut response = Self::new(result, fields);
        response
            .fields
            .add(ResponseFieldName::Error, errors.iter().map(|m| m.to_string()));
        response
    }

    /// Appends a top-level field.
    pub fn add_field(&mut self, name: impl Into<ResponseFieldName>, value: impl Into<String>) {
        self.fields.push(name, value);
    }

    /// Appends an entity.
    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Returns the normalized result.
    pub fn result(&self) -> ResultCode {
        ResultCode::parse(self.first_field(ResponseFieldName::Result))
    }

    pub fn is_successful(&self) -> bool {
        self.result() == ResultCode::Success
    }

    /// Returns the server transaction id, or an empty string.
    pub fn stid(&self) -> &str {
        self.first_field(ResponseFieldName::Stid)
    }

    /// Returns the info messages. Values that are not `<id> <text>` are skipped.
    pub fn info_messages(&self) -> Vec<BusinessMessage> {
        self.messages(ResponseFieldName::Info)
    }

    /// Returns the error messages. Values that are not `<id> <text>` are skipped.
    pub fn error_messages(&self) -> Vec<BusinessMessage> {
        self.messages(ResponseFieldName::Error)
    }

    pub fn warning_messages(&self) -> Vec<BusinessMessage> {
        self.messages(ResponseFieldName::Warning)
    }

    fn messages(&self, name: ResponseFieldName) -> Vec<BusinessMessage> {
        self.fields
            .values(name)
            .into_iter()
            .filter_map(|value| BusinessMessage::parse(value).ok())
            .collect()
    }

    pub fn fields(&self) -> &ResponseFieldList {
        &self.fields
    }

    /// Returns all values of a top-level field.
    pub fn field(&self, name: impl Into<ResponseFieldName>) -> Vec<&str> {
        self.fields.values(name)
    }

    /// Returns the first value of a top-level field, or an empty string.
    pub fn first_field(&self, name: impl Into<ResponseFieldName>) -> &str {
        self.fields.first_value(name)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the distinct entity names in order of first appearance.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entity in &self.entities {
            if !names.contains(&entity.name()) {
                names.push(entity.name());
            }
        }
        names
    }

    /// Returns the first entity with the given name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        let name = name.to_lowercase();
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Extracts every verification information entity.
    pub fn verification_information(
        &self,
    ) -> Result<Vec<VerificationInformation>, ProtocolError> {
        self.entities
            .iter()
            .filter(|entity| entity.name == ENTITY_VERIFICATION_INFORMATION)
            .map(VerificationInformation::from_entity)
            .collect()
    }

    /// Returns the key/value representation used on the wire.
    pub fn encode_kv(&self) -> String {
        let mut out = String::new();
        self.fields.write_kv(&mut out);
        for entity in &self.entities {
            out.push_str("\n\n[");
            out.push_str(&entity.name);
            out.push(']');
            entity.fields.write_kv(&mut out);
        }
        out
    }

    /// Parses a key/value encoded response.
    pub fn parse_kv(text: &str) -> Result<Self, ProtocolError> {
        let (fields, sections) = parse_kv::<ResponseFieldName>(text)?;

        match fields.values(ResponseFieldName::Result).len() {
            0 => return Err(ProtocolError::MissingField("RESULT".to_string())),
            1 => {}
            _ => return Err(ProtocolError::DuplicateField("RESULT".to_string())),
        }
        if fields.values(ResponseFieldName::Stid).len() > 1 {
            return Err(ProtocolError::DuplicateField("STID".to_string()));
        }
        for name in [
            ResponseFieldName::Info,
            ResponseFieldName::Error,
            ResponseFieldName::Warning,
        ] {
            for value in fields.values(name) {
                BusinessMessage::parse(value)?;
            }
        }

        Ok(Self {
            fields,
            entities: sections
                .into_iter()
                .map(|(name, fields)| Entity::new(&name, fields))
                .collect(),
        })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode_kv())
    }
}

/// Detects the encoding of a response and parses it.
///
/// Only the key/value encoding is supported.
pub fn parse_response(text: &str) -> Result<Response, ProtocolError> {
    if is_xml(text) {
        return Err(ProtocolError::Unsupported("XML responses"));
    }
    Response::parse_kv(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESP_ENCODE: &str = "RESULT: success\nINFO: 13000000011 foo\nSTID: 554c2cd7-0885-11eb-a619-610f86f60bcb\nINFO: 13000000011 bar";
    const RESP_INFO_MSG: &str = "RESULT: success\nINFO: 13000000011 Request was processed in test environment - not valid in real world [testing platform]\nSTID: 554c2cd7-0885-11eb-a619-610f86f60bcb";
    const RESP_ERROR_MSG: &str = "RESULT: failed\nSTID: d97b7af9-0886-11eb-a619-610f86f60bcb\nERROR: 63300062009 Domain doesn't exist [foobartestgibtsnet.de]\nINFO: 13000000011 Request was processed in test environment - not valid in real world [testing platform]";
    const RESP_ENTITY: &str = "RESULT: success\nSTID: 10459b07-861a-11ea-b33a-d9ddb946cb7c\n\nDomain: de-registrylock.de\nDomain-Ace: de-registrylock.de\nNserver: ns1.denic.de.\nNserver: ns2.denic.de.\nNserver: ns3.denic.de.\nStatus: connect\nRegistryLock: true\nRegAccId: DENIC-1000006\nRegAccName: DENIC eG\nChanged: 2020-04-23T09:58:11+02:00\n\n[Holder]\nHandle: DENIC-1000006-DENIC\nType: ORG\nName: DENIC eG\nAddress: Kaiserstrasse 75-77\nCity: Frankfurt am Main\nPostalCode: 60329\nCountryCode: DE\nEmail: info@denic.de\nChanged: 2019-04-05T10:26:06+02:00\n";
    const TEST_PLATFORM: &str =
        "Request was processed in test environment - not valid in real world [testing platform]";

    #[test]
    fn test_response_encode_kv() {
        let response = parse_response(RESP_ENCODE).unwrap();
        assert_eq!(response.encode_kv(), RESP_ENCODE);
    }

    #[test]
    fn test_response_info_messages() {
        let response = parse_response(RESP_INFO_MSG).unwrap();
        assert_eq!(
            response.info_messages(),
            vec![BusinessMessage::new(13000000011, TEST_PLATFORM)]
        );
        assert!(response.error_messages().is_empty());
        assert!(response.is_successful());
    }

    #[test]
    fn test_response_error_messages() {
        let response = parse_response(RESP_ERROR_MSG).unwrap();
        assert_eq!(
            response.info_messages(),
            vec![BusinessMessage::new(13000000011, TEST_PLATFORM)]
        );
        assert_eq!(
            response.error_messages(),
            vec![BusinessMessage::new(
                63300062009,
                "Domain doesn't exist [foobartestgibtsnet.de]"
            )]
        );
        assert_eq!(response.result(), ResultCode::Other("failed".to_string()));
        assert!(!response.is_successful());
    }

    #[test]
    fn test_invalid_hand_built_message_skipped() {
        let mut response = Response::failure();
        response.add_field(ResponseFieldName::Error, "not-a-message");
        response.add_field(ResponseFieldName::Error, "42 real error");
        assert_eq!(
            response.error_messages(),
            vec![BusinessMessage::new(42, "real error")]
        );
    }

    #[test]
    fn test_response_entity() {
        let response = parse_response(RESP_ENTITY).unwrap();
        assert_eq!(response.result(), ResultCode::Success);
        assert_eq!(response.stid(), "10459b07-861a-11ea-b33a-d9ddb946cb7c");
        assert_eq!(response.fields().len(), 12);
        assert_eq!(response.field("Domain"), vec!["de-registrylock.de"]);
        assert_eq!(response.field("Domain-Ace"), vec!["de-registrylock.de"]);
        assert_eq!(
            response.field("Nserver"),
            vec!["ns1.denic.de.", "ns2.denic.de.", "ns3.denic.de."]
        );
        assert_eq!(response.field("RegAccName"), vec!["DENIC eG"]);
        assert_eq!(response.field("Changed"), vec!["2020-04-23T09:58:11+02:00"]);

        assert_eq!(response.entity_names(), vec![ENTITY_HOLDER]);
        let entity = response.entity("Holder").unwrap();
        assert_eq!(entity.fields().len(), 9);
        assert_eq!(entity.field("Handle"), vec!["DENIC-1000006-DENIC"]);
        assert_eq!(entity.field("Type"), vec!["ORG"]);
        assert_eq!(entity.field("Address"), vec!["Kaiserstrasse 75-77"]);
        assert_eq!(entity.first_field("Changed"), "2019-04-05T10:26:06+02:00");
    }

    #[test]
    fn test_response_minimal_entity() {
        let response =
            parse_response("RESULT: success\nSTID: abc\n\nDomain: x.de\n\n[Holder]\nHandle: DENIC-1-A\n")
                .unwrap();
        assert_eq!(response.result(), ResultCode::Success);
        assert_eq!(response.stid(), "abc");
        assert_eq!(response.field("Domain"), vec!["x.de"]);
        assert_eq!(response.entities().len(), 1);
        assert_eq!(response.entities()[0].name(), "holder");
        assert_eq!(response.entities()[0].field("Handle"), vec!["DENIC-1-A"]);
    }

    #[test]
    fn test_response_entities_roundtrip() {
        let response = parse_response(RESP_ENTITY).unwrap();
        let encoded = response.encode_kv();
        assert!(encoded.contains("\n\n[holder]\nHANDLE: DENIC-1000006-DENIC"));
        assert_eq!(parse_response(&encoded).unwrap(), response);
    }

    #[test]
    fn test_repeated_entities() {
        let response = parse_response(
            "RESULT: success\n[Holder]\nHandle: DENIC-1-A\n[holder]\nHandle: DENIC-1-B\n[AbuseContact]\nHandle: DENIC-1-C",
        )
        .unwrap();
        assert_eq!(response.entities().len(), 3);
        assert_eq!(response.entity_names(), vec!["holder", "abusecontact"]);
        assert_eq!(response.entity("HOLDER").unwrap().first_field("handle"), "DENIC-1-A");
        assert_eq!(response.entities()[1].first_field("handle"), "DENIC-1-B");
        assert!(response.entity("generalrequest").is_none());
    }

    #[test]
    fn test_parse_response_errors() {
        assert!(matches!(
            parse_response("STID: abc"),
            Err(ProtocolError::MissingField(_))
        ));
        assert!(matches!(
            parse_response("RESULT: success\nRESULT: failure"),
            Err(ProtocolError::DuplicateField(_))
        ));
        assert!(matches!(
            parse_response("RESULT: success\nSTID: a\nSTID: b"),
            Err(ProtocolError::DuplicateField(_))
        ));
        assert!(matches!(
            parse_response("RESULT: success\nINFO: not-a-number text"),
            Err(ProtocolError::InvalidBusinessMessage { .. })
        ));
        assert!(matches!(
            parse_response("RESULT: success\nWARNING: 12345"),
            Err(ProtocolError::InvalidBusinessMessage { .. })
        ));
        assert!(matches!(
            parse_response("RESULT: success\n[holder]\nbroken"),
            Err(ProtocolError::MalformedLine { index: 2, .. })
        ));
        assert!(matches!(
            parse_response("<registry-response/>"),
            Err(ProtocolError::Unsupported(_))
        ));
    }

    #[test]
    fn test_parse_business_message() {
        let msg = BusinessMessage::parse(&format!("13000000011 {}", TEST_PLATFORM)).unwrap();
        assert_eq!(msg, BusinessMessage::new(13000000011, TEST_PLATFORM));

        assert!(BusinessMessage::parse("13000000011").is_err());
        assert!(BusinessMessage::parse(TEST_PLATFORM).is_err());
        assert!(BusinessMessage::parse("").is_err());
    }

    #[test]
    fn test_new_response_with_messages() {
        let response = Response::new_with_error(
            ResultCode::Failure,
            ResponseFieldList::new(),
            &[BusinessMessage::new(83000000010, "Please login first")],
        );
        assert_eq!(
            response.encode_kv(),
            "RESULT: failure\nERROR: 83000000010 Please login first"
        );

        let mut fields = ResponseFieldList::new();
        fields.push("Domain", "denic.de");
        let response = Response::new_with_info(
            ResultCode::Success,
            fields,
            &[BusinessMessage::new(1, "ok")],
        );
        assert_eq!(
            response.encode_kv(),
            "RESULT: success\nDOMAIN: denic.de\nINFO: 1 ok"
        );
    }
}
