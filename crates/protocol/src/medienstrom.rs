//! Medienstrom-Nachrichten
//!
//! Eingehende Nachrichten sind ueber das Feld `event` getaggt:
//! `connected`, `start`, `media`, `mark`, `stop`. Unbekannte Events werden
//! als [`MedienNachricht::Unbekannt`] geparst und vom Aufrufer ignoriert.
//!
//! Ausgehend wird nur `media` verschickt, siehe [`AusgehendeMedien`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{ProtokollError, ProtokollResult};

/// Eingehende Nachricht der Telefonie-Gegenstelle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum MedienNachricht {
    Connected {
        #[serde(default)]
        protocol: Option<String>,
    },
    Start {
        start: StartInfo,
    },
    Media {
        media: MedienNutzlast,
    },
    Mark {
        #[serde(default)]
        mark: Option<MarkInfo>,
    },
    Stop {
        #[serde(default, rename = "streamSid")]
        stream_sid: Option<String>,
    },
    #[serde(other)]
    Unbekannt,
}

impl MedienNachricht {
    /// Parst eine JSON-Textnachricht
    pub fn parsen(text: &str) -> ProtokollResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Inhalt des `start`-Events
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StartInfo {
    #[serde(default, rename = "streamSid")]
    pub stream_sid: Option<String>,
    #[serde(default, rename = "callSid")]
    pub call_sid: Option<String>,
}

impl StartInfo {
    /// Stream-ID, ohne die keine Antwort adressiert werden kann
    pub fn stream_sid(&self) -> ProtokollResult<&str> {
        self.stream_sid
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ProtokollError::FehlendesFeld("start.streamSid"))
    }
}

/// Audio-Nutzlast eines `media`-Events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedienNutzlast {
    /// base64-kodiertes 8 kHz µ-law
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
}

impl MedienNutzlast {
    /// Dekodiert die base64-Nutzlast zu rohen µ-law-Bytes
    pub fn payload_dekodieren(&self) -> ProtokollResult<Vec<u8>> {
        Ok(STANDARD.decode(self.payload.as_bytes())?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
struct AusgehendeNutzlast {
    payload: String,
}

/// Ausgehendes `media`-Event mit µ-law-Audio
#[derive(Debug, Clone, Serialize)]
pub struct AusgehendeMedien {
    event: &'static str,
    #[serde(rename = "streamSid")]
    stream_sid: String,
    media: AusgehendeNutzlast,
}

impl AusgehendeMedien {
    pub fn neu(stream_sid: impl Into<String>, ulaw: &[u8]) -> Self {
        Self {
            event: "media",
            stream_sid: stream_sid.into(),
            media: AusgehendeNutzlast {
                payload: STANDARD.encode(ulaw),
            },
        }
    }

    pub fn als_json(&self) -> ProtokollResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_event_parsen() {
        let text = r#"{
            "event": "start",
            "sequenceNumber": "1",
            "start": {
                "streamSid": "MZ123",
                "callSid": "CA456",
                "tracks": ["inbound"],
                "mediaFormat": {"encoding": "audio/x-mulaw", "sampleRate": 8000, "channels": 1}
            },
            "streamSid": "MZ123"
        }"#;
        let nachricht = MedienNachricht::parsen(text).unwrap();
        match nachricht {
            MedienNachricht::Start { start } => {
                assert_eq!(start.stream_sid().unwrap(), "MZ123");
                assert_eq!(start.call_sid.as_deref(), Some("CA456"));
            }
            andere => panic!("Start erwartet, erhalten: {andere:?}"),
        }
    }

    #[test]
    fn start_ohne_stream_sid() {
        let nachricht = MedienNachricht::parsen(r#"{"event":"start","start":{}}"#).unwrap();
        let MedienNachricht::Start { start } = nachricht else {
            panic!("Start erwartet");
        };
        assert!(matches!(
            start.stream_sid(),
            Err(ProtokollError::FehlendesFeld("start.streamSid"))
        ));
    }

    #[test]
    fn media_event_dekodieren() {
        let text = r#"{"event":"media","streamSid":"MZ1","media":{"track":"inbound","chunk":"2","timestamp":"40","payload":"/38A"}}"#;
        let MedienNachricht::Media { media } = MedienNachricht::parsen(text).unwrap() else {
            panic!("Media erwartet");
        };
        assert_eq!(media.payload_dekodieren().unwrap(), vec![0xFF, 0x7F, 0x00]);
    }

    #[test]
    fn kaputtes_base64_ist_fehler() {
        let media = MedienNutzlast {
            payload: "%%%".into(),
            track: None,
        };
        assert!(matches!(
            media.payload_dekodieren(),
            Err(ProtokollError::Base64(_))
        ));
    }

    #[test]
    fn stop_und_connected_parsen() {
        let stop = MedienNachricht::parsen(
            r#"{"event":"stop","streamSid":"MZ1","stop":{"callSid":"CA1"}}"#,
        )
        .unwrap();
        assert_eq!(
            stop,
            MedienNachricht::Stop {
                stream_sid: Some("MZ1".into())
            }
        );

        let connected =
            MedienNachricht::parsen(r#"{"event":"connected","protocol":"Call","version":"1.0.0"}"#)
                .unwrap();
        assert!(matches!(connected, MedienNachricht::Connected { .. }));
    }

    #[test]
    fn unbekanntes_event_wird_toleriert() {
        let n = MedienNachricht::parsen(r#"{"event":"dtmf","dtmf":{"digit":"1"}}"#).unwrap();
        assert_eq!(n, MedienNachricht::Unbekannt);
    }

    #[test]
    fn kein_json_ist_fehler() {
        assert!(matches!(
            MedienNachricht::parsen("hallo"),
            Err(ProtokollError::Json(_))
        ));
    }

    #[test]
    fn ausgehende_medien_format() {
        let json = AusgehendeMedien::neu("MZ9", &[0xFF, 0x7F, 0x00])
            .als_json()
            .unwrap();
        let wert: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(wert["event"], "media");
        assert_eq!(wert["streamSid"], "MZ9");
        assert_eq!(wert["media"]["payload"], "/38A");
    }
}
