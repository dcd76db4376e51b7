//! Agent responses: the wire schema, raw adapter output, and the
//! validator/normalizer that turns one into the other.

pub mod normalize;
pub mod parsing;
pub mod schema;

pub use normalize::{DEFAULT_FALLBACK_CONFIDENCE, NormalizedResponse, ResponseNormalizer};
pub use parsing::{RawOutput, extract_json_object};
pub use schema::{AgentResponse, Confidence, ResponseBody, ResponseMetadata};
