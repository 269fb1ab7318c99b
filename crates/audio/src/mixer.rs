//! Mischung zweier PCM-Spuren

/// Mischt zwei 16 Bit LE PCM-Spuren.
///
/// Beide Spuren werden auf gerade Laenge gekuerzt, die kuerzere mit Stille
/// aufgefuellt. Jede Spur wird vor der Summierung halbiert, damit die Summe
/// im 16-Bit-Bereich bleibt.
pub fn mischen(a: &[u8], b: &[u8]) -> Vec<u8> {
    let a = &a[..a.len() & !1];
    let b = &b[..b.len() & !1];
    let laenge = a.len().max(b.len());

    let mut ausgabe = Vec::with_capacity(laenge);
    for i in (0..laenge).step_by(2) {
        let s = sample(a, i) / 2 + sample(b, i) / 2;
        ausgabe.extend_from_slice(&(s.clamp(i16::MIN as i32, i16::MAX as i32) as i16).to_le_bytes());
    }
    ausgabe
}

fn sample(spur: &[u8], i: usize) -> i32 {
    match spur.get(i..i + 2) {
        Some(s) => i16::from_le_bytes([s[0], s[1]]) as i32,
        None => 0,
    }
}
