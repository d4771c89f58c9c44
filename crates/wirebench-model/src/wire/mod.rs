mod ack;
pub use ack::{ErrorBody, HealthStatus, JsonAck, ReceivedPayloadInfo, XmlAck};
