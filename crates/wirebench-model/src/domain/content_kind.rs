use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire format of a benchmark payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Json,
    Xml,
}

impl ContentKind {
    /// Content type sent by the client for this kind.
    pub fn mime(&self) -> &'static str {
        match self {
            ContentKind::Json => "application/json",
            ContentKind::Xml => "application/xml",
        }
    }

    /// Endpoint suffix serving this kind.
    pub fn path(&self) -> &'static str {
        match self {
            ContentKind::Json => "/json",
            ContentKind::Xml => "/xml",
        }
    }

    /// Returns a short symbolic identifier for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentKind::Json => "json",
            ContentKind::Xml => "xml",
        }
    }

    /// Returns `true` if a request `Content-Type` header value is accepted for this kind.
    ///
    /// Media type parameters (`; charset=utf-8`) are ignored and the comparison is case-insensitive:
    /// - json: `application/json`, `text/json`
    /// - xml: `application/xml`, `text/xml`, `application/*+xml`
    pub fn accepts(&self, content_type: &str) -> bool {
        let media = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match self {
            ContentKind::Json => matches!(media.as_str(), "application/json" | "text/json"),
            ContentKind::Xml => {
                matches!(media.as_str(), "application/xml" | "text/xml")
                    || media
                        .strip_prefix("application/")
                        .is_some_and(|sub| sub.len() > "+xml".len() && sub.ends_with("+xml"))
            }
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_accepts_json_media_types() {
        assert!(ContentKind::Json.accepts("application/json"));
        assert!(ContentKind::Json.accepts("text/json"));
        assert!(ContentKind::Json.accepts("Application/JSON; charset=utf-8"));

        assert!(!ContentKind::Json.accepts("application/xml"));
        assert!(!ContentKind::Json.accepts("text/plain"));
        assert!(!ContentKind::Json.accepts(""));
    }

    #[test]
    fn xml_accepts_xml_media_types() {
        assert!(ContentKind::Xml.accepts("application/xml"));
        assert!(ContentKind::Xml.accepts("text/xml; charset=utf-8"));
        assert!(ContentKind::Xml.accepts("application/atom+xml"));

        assert!(!ContentKind::Xml.accepts("application/+xml"));
        assert!(!ContentKind::Xml.accepts("application/json"));
        assert!(!ContentKind::Xml.accepts("text/atom+xml"));
    }

    #[test]
    fn mime_and_path() {
        assert_eq!(ContentKind::Json.mime(), "application/json");
        assert_eq!(ContentKind::Xml.mime(), "application/xml");
        assert_eq!(ContentKind::Json.path(), "/json");
        assert_eq!(ContentKind::Xml.path(), "/xml");
        assert_eq!(ContentKind::Xml.to_string(), "xml");
    }
}
