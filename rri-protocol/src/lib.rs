//! # rri-protocol
//!
//! Wire protocol implementation for RRI, the registry protocol used to
//! manage domains and contact handles.
//!
//! This crate provides:
//! - Length-prefixed framing of UTF-8 messages
//! - Ordered, multi-valued field lists with normalized names
//! - Query and Response value objects with their key/value text codec
//! - The action and field vocabulary, DENIC handles and contact data
//! - Censoring of sensitive fields in raw messages

pub mod censor;
pub mod codec;
pub mod data;
pub mod error;
pub mod fields;
pub mod frame;
pub mod handle;
pub mod query;
pub mod response;
pub mod verification;
pub mod vocabulary;

pub use censor::censor_raw_message;
pub use codec::{read_message, write_message, Decoder, Encoder};
pub use data::{put_domain_to_query_fields, ContactData, DomainData, PersonToVerify};
pub use error::ProtocolError;
pub use fields::{Field, FieldList, FieldName, QueryFieldList, ResponseFieldList};
pub use frame::{Frame, FRAME_HEADER_SIZE};
pub use handle::{ContactType, DenicHandle};
pub use query::{parse_query, Query, Section};
pub use response::{parse_response, BusinessMessage, Entity, Response};
pub use verification::{
    TrustFramework, VerificationClaim, VerificationEvidence, VerificationInformation,
    VerificationMethod, VerificationResult,
};
pub use vocabulary::{Action, QueryFieldName, ResponseFieldName, ResultCode};

/// Protocol version sent by the query constructors.
pub const LATEST_VERSION: &str = "5.0";

/// Default port of an RRI server.
pub const DEFAULT_PORT: u16 = 51131;

/// Maximum message payload size (64 KiB).
pub const MAX_MESSAGE_SIZE: u32 = 65536;
