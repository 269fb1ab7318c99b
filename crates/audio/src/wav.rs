//! WAV-Dateien im festen Telefonformat (8 kHz, mono, 16 Bit)

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{AudioError, AudioResult};
use crate::format::{BITS_PRO_SAMPLE, KANAELE, SAMPLE_RATE};

fn spec() -> WavSpec {
    WavSpec {
        channels: KANAELE,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PRO_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Schreibt 16 Bit LE PCM als WAV-Datei
pub fn wav_schreiben(pfad: &Path, pcm: &[u8]) -> AudioResult<()> {
    let mut writer = WavWriter::create(pfad, spec())?;
    for s in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([s[0], s[1]]))?;
    }
    writer.finalize()?;
    Ok(())
}

/// Liest eine WAV-Datei zurueck zu 16 Bit LE PCM.
///
/// Andere Formate als 8 kHz/mono/16 Bit werden abgelehnt.
pub fn wav_lesen(pfad: &Path) -> AudioResult<Vec<u8>> {
    let mut reader = WavReader::open(pfad)?;
    let s = reader.spec();
    if s.sample_rate != SAMPLE_RATE || s.channels != KANAELE || s.bits_per_sample != BITS_PRO_SAMPLE
    {
        return Err(AudioError::UngueltigesFormat(format!(
            "erwartet 8kHz mono 16bit, erhalten {}Hz {}ch {}bit",
            s.sample_rate, s.channels, s.bits_per_sample
        )));
    }

    let mut pcm = Vec::with_capacity(reader.len() as usize * 2);
    for sample in reader.samples::<i16>() {
        pcm.extend_from_slice(&sample?.to_le_bytes());
    }
    Ok(pcm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_schreiben_und_lesen() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("test.wav");
        let pcm: Vec<u8> = [0i16, 1000, -1000, i16::MAX]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();

        wav_schreiben(&pfad, &pcm).unwrap();
        assert_eq!(wav_lesen(&pfad).unwrap(), pcm);

        let reader = WavReader::open(&pfad).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.duration(), 4);
    }

    #[test]
    fn falsches_format_wird_abgelehnt() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("stereo.wav");
        let mut writer = WavWriter::create(
            &pfad,
            WavSpec {
                channels: 2,
                ..spec()
            },
        )
        .unwrap();
        writer.write_sample(0i16).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();

        assert!(matches!(
            wav_lesen(&pfad),
            Err(AudioError::UngueltigesFormat(_))
        ));
    }
}
