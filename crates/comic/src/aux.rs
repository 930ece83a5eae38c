/// Auxiliary text fields carried in the record's `description` column.
///
/// The column holds either a structured JSON encoding (needed once the
/// template grew more free-text fields than the schema has columns) or, for
/// older rows, the plain subtitle string. Decoding happens exactly once at
/// rehydration; nothing else re-sniffs the shape.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuxFields {
    Structured {
        #[serde(default)]
        subtitle: String,
        #[serde(default)]
        cover_caption: String,
        #[serde(default)]
        message_text: String,
        #[serde(default)]
        cover_date: String,
    },
    Legacy(String),
}

impl AuxFields {
    /// Decode a description column. A plain string (legacy rows, or rows
    /// written by other tooling) becomes `Legacy`; a JSON object with any of
    /// the known keys becomes `Structured` with absent keys defaulted.
    pub fn decode(description: &str) -> Self {
        if description.trim_start().starts_with('{') {
            if let Ok(decoded) = serde_json::from_str::<AuxFields>(description) {
                if matches!(decoded, AuxFields::Structured { .. }) {
                    return decoded;
                }
            }
        }
        AuxFields::Legacy(description.to_string())
    }

    /// Encode for the description column. Stays on the legacy plain-string
    /// form while only the subtitle is set, so rows remain readable by
    /// tooling that expects free text there.
    pub fn encode(&self) -> crate::Result<String> {
        match self {
            AuxFields::Legacy(raw) => Ok(raw.clone()),
            AuxFields::Structured {
                subtitle,
                cover_caption,
                message_text,
                cover_date,
            } => {
                if cover_caption.is_empty() && message_text.is_empty() && cover_date.is_empty() {
                    Ok(subtitle.clone())
                } else {
                    Ok(serde_json::to_string(self)?)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_plain_string_round_trip() {
        let decoded = AuxFields::decode("our little story");
        assert_eq!(decoded, AuxFields::Legacy("our little story".to_string()));
        assert_eq!(decoded.encode().unwrap(), "our little story");
    }

    #[test]
    fn test_structured_round_trip() {
        let aux = AuxFields::Structured {
            subtitle: "sub".to_string(),
            cover_caption: "cap".to_string(),
            message_text: "hi mum".to_string(),
            cover_date: "5\nJun".to_string(),
        };
        let encoded = aux.encode().unwrap();
        assert!(encoded.starts_with('{'));
        assert_eq!(AuxFields::decode(&encoded), aux);
    }

    #[test]
    fn test_subtitle_only_stays_plain() {
        let aux = AuxFields::Structured {
            subtitle: "just a subtitle".to_string(),
            cover_caption: String::new(),
            message_text: String::new(),
            cover_date: String::new(),
        };
        assert_eq!(aux.encode().unwrap(), "just a subtitle");
    }

    #[test]
    fn test_partial_object_defaults_missing_fields() {
        let decoded = AuxFields::decode(r#"{"subtitle":"s","message_text":"m"}"#);
        match decoded {
            AuxFields::Structured {
                subtitle,
                cover_caption,
                message_text,
                cover_date,
            } => {
                assert_eq!(subtitle, "s");
                assert_eq!(message_text, "m");
                assert_eq!(cover_caption, "");
                assert_eq!(cover_date, "");
            }
            other => panic!("expected structured, got {:?}", other),
        }
    }

    #[test]
    fn test_braces_in_free_text_fall_back_to_legacy() {
        let decoded = AuxFields::decode("{not json at all");
        assert_eq!(decoded, AuxFields::Legacy("{not json at all".to_string()));
    }
}
