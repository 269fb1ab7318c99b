//! Festes Audioformat des Telefon-Legs

use std::time::Duration;

/// Abtastrate in Hz
pub const SAMPLE_RATE: u32 = 8000;
/// Bytes pro Sample (16 Bit signed PCM)
pub const BYTES_PRO_SAMPLE: usize = 2;
/// Anzahl Kanaele
pub const KANAELE: u16 = 1;
/// Bits pro Sample
pub const BITS_PRO_SAMPLE: u16 = 16;

/// Bytes pro Sekunde PCM
pub const BYTES_PRO_SEKUNDE: usize = SAMPLE_RATE as usize * BYTES_PRO_SAMPLE;

/// Anzahl PCM-Bytes fuer die gegebene Dauer, auf Sample-Grenze
pub fn chunk_bytes(dauer: Duration) -> usize {
    let bytes = (dauer.as_micros() as usize * BYTES_PRO_SEKUNDE) / 1_000_000;
    bytes & !1
}

/// Abspieldauer einer PCM-Byte-Menge
pub fn dauer_von_bytes(bytes: usize) -> Duration {
    Duration::from_secs_f64(bytes as f64 / BYTES_PRO_SEKUNDE as f64)
}

/// Rundet einen Byte-Offset auf die Sample-Grenze ab
pub fn auf_sample_grenze(offset: usize) -> usize {
    offset & !1
}
