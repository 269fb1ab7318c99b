//! Ausrichtung ausgehender Sprache an der eingehenden Zeitleiste
//!
//! Das eingehende Audio waechst kontinuierlich. Seine aktuelle Laenge ist
//! die Uhr, an der jedes ausgehende Segment verankert wird: der Offset ist
//! die Laenge der Zeitleiste in dem Moment, in dem die Wiedergabe begann.
//!
//! Ueberlappen sich Segmente, gewinnt das zuletzt aufgezeichnete.

use bytes::Bytes;

use crate::format::auf_sample_grenze;

/// Ein ausgehendes Audiosegment, verankert an einem Byte-Offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSegment {
    /// Laenge der eingehenden Zeitleiste beim Start der Wiedergabe
    pub offset: usize,
    /// Rohes 16 Bit PCM
    pub audio: Bytes,
}

/// Eingehende Zeitleiste plus verankerte ausgehende Segmente eines Anrufs
#[derive(Debug, Default)]
pub struct AudioAusrichtung {
    inbound: Vec<u8>,
    segmente: Vec<OutboundSegment>,
}

impl AudioAusrichtung {
    pub fn new() -> Self {
        Self::default()
    }

    /// Haengt eingehendes PCM an die Zeitleiste an
    pub fn inbound_anhaengen(&mut self, pcm: &[u8]) {
        self.inbound.extend_from_slice(pcm);
    }

    /// Aktuelle Laenge der Zeitleiste in Bytes
    pub fn inbound_laenge(&self) -> usize {
        self.inbound.len()
    }

    /// Zeichnet ein ausgehendes Segment auf.
    ///
    /// `start_offset` muss vor dem Versand erfasst worden sein.
    pub fn outbound_aufzeichnen(&mut self, audio: Bytes, start_offset: usize) {
        self.segmente.push(OutboundSegment {
            offset: auf_sample_grenze(start_offset),
            audio,
        });
    }

    pub fn inbound(&self) -> &[u8] {
        &self.inbound
    }

    pub fn segmente(&self) -> &[OutboundSegment] {
        &self.segmente
    }

    pub fn hat_outbound(&self) -> bool {
        !self.segmente.is_empty()
    }

    /// Baut die ausgehende Spur mit Stille aufgefuellt auf `gesamt` Bytes.
    ///
    /// Segmente werden in Aufzeichnungsreihenfolge eingespielt und am Ende
    /// abgeschnitten. Segmente hinter dem Ende werden uebersprungen.
    pub fn ausgerichtetes_outbound(&self, gesamt: usize) -> Vec<u8> {
        let gesamt = auf_sample_grenze(gesamt);
        let mut spur = vec![0u8; gesamt];

        for segment in &self.segmente {
            let start = auf_sample_grenze(segment.offset);
            if start >= gesamt {
                tracing::warn!(
                    offset = segment.offset,
                    gesamt,
                    "Ausgehendes Segment ausserhalb der Zeitleiste – uebersprungen"
                );
                continue;
            }
            let nutzbar = auf_sample_grenze(segment.audio.len()).min(gesamt - start);
            spur[start..start + nutzbar].copy_from_slice(&segment.audio[..nutzbar]);
        }

        spur
    }

    /// Alle Segmente ohne Stille hintereinander
    pub fn rohes_outbound(&self) -> Vec<u8> {
        let laenge = self.segmente.iter().map(|s| s.audio.len()).sum();
        let mut spur = Vec::with_capacity(laenge);
        for segment in &self.segmente {
            spur.extend_from_slice(&segment.audio);
        }
        spur
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ausrichtung_mit_inbound(laenge: usize) -> AudioAusrichtung {
        let mut a = AudioAusrichtung::new();
        a.inbound_anhaengen(&vec![1u8; laenge]);
        a
    }

    #[test]
    fn zeitleiste_waechst_monoton() {
        let mut a = AudioAusrichtung::new();
        a.inbound_anhaengen(&[1, 2]);
        a.inbound_anhaengen(&[3, 4, 5, 6]);
        assert_eq!(a.inbound_laenge(), 6);
        assert_eq!(a.inbound(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn segment_liegt_exakt_an_seinem_offset() {
        let mut a = ausrichtung_mit_inbound(100);
        let payload: Vec<u8> = (10..30).collect();
        a.outbound_aufzeichnen(Bytes::from(payload.clone()), 40);

        let spur = a.ausgerichtetes_outbound(100);
        assert_eq!(spur.len(), 100);
        assert!(spur[..40].iter().all(|&b| b == 0));
        assert_eq!(&spur[40..60], payload.as_slice());
        assert!(spur[60..].iter().all(|&b| b == 0));
    }

    #[test]
    fn ueberstand_wird_abgeschnitten() {
        let mut a = ausrichtung_mit_inbound(50);
        a.outbound_aufzeichnen(Bytes::from(vec![9u8; 40]), 30);
        let spur = a.ausgerichtetes_outbound(50);
        assert_eq!(spur.len(), 50);
        assert!(spur[30..].iter().all(|&b| b == 9));
    }

    #[test]
    fn segment_ausserhalb_wird_uebersprungen() {
        let mut a = ausrichtung_mit_inbound(20);
        a.outbound_aufzeichnen(Bytes::from(vec![9u8; 10]), 20);
        a.outbound_aufzeichnen(Bytes::from(vec![7u8; 4]), 2);
        let spur = a.ausgerichtetes_outbound(20);
        assert_eq!(&spur[2..6], &[7, 7, 7, 7]);
        assert_eq!(spur.iter().filter(|&&b| b == 9).count(), 0);
    }

    #[test]
    fn gesamtlaenge_und_offset_auf_sample_grenze() {
        let mut a = ausrichtung_mit_inbound(11);
        a.outbound_aufzeichnen(Bytes::from(vec![5u8; 3]), 3);
        assert_eq!(a.segmente()[0].offset, 2);

        let spur = a.ausgerichtetes_outbound(11);
        assert_eq!(spur.len(), 10);
        // Ungerade Nutzlast verliert ihr letztes Byte
        assert_eq!(&spur[..6], &[0, 0, 5, 5, 0, 0]);
    }

    #[test]
    fn spaeteres_segment_gewinnt_bei_ueberlappung() {
        let mut a = ausrichtung_mit_inbound(20);
        a.outbound_aufzeichnen(Bytes::from(vec![1u8; 10]), 0);
        a.outbound_aufzeichnen(Bytes::from(vec![2u8; 10]), 6);
        let spur = a.ausgerichtetes_outbound(20);
        assert_eq!(&spur[..6], &[1; 6]);
        assert_eq!(&spur[6..16], &[2; 10]);
        assert_eq!(&spur[16..], &[0; 4]);
    }

    #[test]
    fn rohe_spur_ohne_stille() {
        let mut a = ausrichtung_mit_inbound(1000);
        a.outbound_aufzeichnen(Bytes::from_static(&[1, 1]), 500);
        a.outbound_aufzeichnen(Bytes::from_static(&[2, 2, 2, 2]), 10);
        assert_eq!(a.rohes_outbound(), vec![1, 1, 2, 2, 2, 2]);
        assert!(a.hat_outbound());
    }

    #[test]
    fn leere_zeitleiste_liefert_leere_spur() {
        let mut a = AudioAusrichtung::new();
        a.outbound_aufzeichnen(Bytes::from_static(&[1, 1]), 0);
        assert!(a.ausgerichtetes_outbound(0).is_empty());
    }
}
