//! G.711 µ-law Kodierung
//!
//! Der Telefonie-Transport liefert und erwartet 8 kHz µ-law. Intern wird
//! ausschliesslich mit 16 Bit Little-Endian PCM gearbeitet.

const BIAS: i32 = 0x84;
const CLIP: i32 = 32635;

/// Dekodiert ein einzelnes µ-law-Byte zu einem linearen Sample
pub fn ulaw_dekodieren(u: u8) -> i16 {
    let u = !u;
    let sign = u & 0x80;
    let exponent = (u >> 4) & 0x07;
    let mantisse = (u & 0x0F) as i32;

    let betrag = (((mantisse << 3) + BIAS) << exponent) - BIAS;
    if sign != 0 {
        -betrag as i16
    } else {
        betrag as i16
    }
}

/// Kodiert ein lineares Sample zu einem µ-law-Byte
pub fn ulaw_kodieren(sample: i16) -> u8 {
    let mut pcm = sample as i32;
    let sign = if pcm < 0 {
        pcm = -pcm;
        0x80
    } else {
        0x00
    };
    pcm = pcm.min(CLIP) + BIAS;

    let mut exponent = 7;
    let mut maske = 0x4000;
    while exponent > 0 && pcm & maske == 0 {
        exponent -= 1;
        maske >>= 1;
    }
    let mantisse = (pcm >> (exponent + 3)) & 0x0F;

    !((sign | (exponent << 4) | mantisse) as u8)
}

/// µ-law-Bytes → 16 Bit LE PCM (doppelte Laenge)
pub fn ulaw_zu_pcm(ulaw: &[u8]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(ulaw.len() * 2);
    for &u in ulaw {
        pcm.extend_from_slice(&ulaw_dekodieren(u).to_le_bytes());
    }
    pcm
}

/// 16 Bit LE PCM → µ-law-Bytes (halbe Laenge)
///
/// Ein ueberzaehliges letztes Byte wird verworfen.
pub fn pcm_zu_ulaw(pcm: &[u8]) -> Vec<u8> {
    pcm.chunks_exact(2)
        .map(|s| ulaw_kodieren(i16::from_le_bytes([s[0], s[1]])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dekodieren_referenzwerte() {
        assert_eq!(ulaw_dekodieren(0xFF), 0);
        assert_eq!(ulaw_dekodieren(0x7F), 0);
        assert_eq!(ulaw_dekodieren(0x00), -32124);
        assert_eq!(ulaw_dekodieren(0x80), 32124);
    }

    #[test]
    fn kodieren_referenzwerte() {
        assert_eq!(ulaw_kodieren(0), 0xFF);
        assert_eq!(ulaw_kodieren(32124), 0x80);
        assert_eq!(ulaw_kodieren(-32124), 0x00);
        // Uebersteuerung wird geklemmt
        assert_eq!(ulaw_kodieren(i16::MAX), 0x80);
        assert_eq!(ulaw_kodieren(i16::MIN), 0x00);
    }

    #[test]
    fn jedes_ulaw_byte_ueberlebt_den_rueckweg() {
        // 0x7F (negative Null) wird zu 0xFF normalisiert
        for u in 0u8..=255 {
            if u == 0x7F {
                continue;
            }
            assert_eq!(ulaw_kodieren(ulaw_dekodieren(u)), u, "Byte {u:#04x}");
        }
    }

    #[test]
    fn pcm_laenge_verdoppelt() {
        let pcm = ulaw_zu_pcm(&[0xFF, 0x80, 0x00]);
        assert_eq!(pcm.len(), 6);
        assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), 32124);
    }

    #[test]
    fn ungerades_pcm_verliert_letztes_byte() {
        let ulaw = pcm_zu_ulaw(&[0, 0, 0, 0, 7]);
        assert_eq!(ulaw, vec![0xFF, 0xFF]);
    }
}
