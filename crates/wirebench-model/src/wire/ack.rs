use serde::Serialize;

use crate::ContentKind;

/// Metadata about one inbound payload, used only to build its acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedPayloadInfo {
    pub bytes: usize,
    pub pid: u32,
    pub kind: ContentKind,
}

impl ReceivedPayloadInfo {
    pub fn new(kind: ContentKind, bytes: usize, pid: u32) -> Self {
        Self { bytes, pid, kind }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            ContentKind::Json => "JSON received successfully",
            ContentKind::Xml => "XML received successfully",
        }
    }

    pub fn json_ack(&self) -> JsonAck {
        JsonAck {
            message: self.message().to_string(),
            received_bytes: self.bytes,
            pid: self.pid,
        }
    }

    pub fn xml_ack(&self) -> XmlAck {
        XmlAck {
            message: self.message(),
            received_bytes: self.bytes,
            pid: self.pid,
        }
    }
}

/// `POST /json` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonAck {
    pub message: String,
    pub received_bytes: usize,
    pub pid: u32,
}

/// `POST /xml` acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlAck {
    pub message: &'static str,
    pub received_bytes: usize,
    pub pid: u32,
}

impl XmlAck {
    /// Render as `<response><message/><receivedBytes/><pid/></response>`.
    ///
    /// The message is a fixed ASCII literal, so no escaping is needed.
    pub fn render(&self) -> String {
        format!(
            "<response><message>{}</message><receivedBytes>{}</receivedBytes><pid>{}</pid></response>",
            self.message, self.received_bytes, self.pid
        )
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub pid: u32,
}

/// Error body returned by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub pid: u32,
}

impl ErrorBody {
    pub const INTERNAL: &'static str = "Internal Server Error";

    pub fn new(error: impl Into<String>, pid: u32) -> Self {
        Self {
            error: error.into(),
            pid,
        }
    }

    pub fn internal(pid: u32) -> Self {
        Self::new(Self::INTERNAL, pid)
    }
}
