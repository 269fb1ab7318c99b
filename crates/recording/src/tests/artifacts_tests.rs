//! Unit-Tests fuer die Artefakt-Persistenz

use bytes::Bytes;
use callprobe_audio::{wav_lesen, AudioAusrichtung};
use callprobe_core::{CallId, Sprecher};

use crate::artifacts::Aufnahme;
use crate::ledger::UtteranceLedger;

fn pcm(wert: i16, samples: usize) -> Vec<u8> {
    wert.to_le_bytes().repeat(samples)
}

fn test_aufnahme(mit_outbound: bool) -> Aufnahme {
    let mut ledger = UtteranceLedger::neu(CallId("test_call".into()), "James Wilson", "Refill");
    ledger.aufzeichnen(Sprecher::Gegenseite, "Pharmacy line, how can I help?");

    let mut ausrichtung = AudioAusrichtung::new();
    ausrichtung.inbound_anhaengen(&pcm(1000, 800));
    if mit_outbound {
        ausrichtung.outbound_aufzeichnen(Bytes::from(pcm(2000, 200)), 400);
    }

    Aufnahme {
        transkript: ledger.export(),
        ausrichtung,
    }
}

#[tokio::test]
async fn test_alle_artefakte_werden_geschrieben() {
    let dir = tempfile::tempdir().expect("Temp-Verzeichnis konnte nicht erstellt werden");
    let aufnahme = test_aufnahme(true);

    let bericht = aufnahme.speichern(dir.path());
    assert!(bericht.ist_vollstaendig(), "Fehler: {:?}", bericht.fehler);
    assert_eq!(bericht.verzeichnis, dir.path().join("test_call"));
    for name in [
        "transcript.json",
        "transcript.txt",
        "inbound.wav",
        "outbound.wav",
        "outbound_raw.wav",
        "combined.wav",
    ] {
        assert!(bericht.verzeichnis.join(name).exists(), "{name} fehlt");
    }

    // Ausgerichtete Spur hat exakt die Laenge der eingehenden
    let outbound = wav_lesen(&bericht.verzeichnis.join("outbound.wav")).unwrap();
    assert_eq!(outbound.len(), 1600);
    assert_eq!(&outbound[400..800], pcm(2000, 200).as_slice());
    assert!(outbound[..400].iter().all(|&b| b == 0));

    let roh = wav_lesen(&bericht.verzeichnis.join("outbound_raw.wav")).unwrap();
    assert_eq!(roh.len(), 400);

    let kombiniert = wav_lesen(&bericht.verzeichnis.join("combined.wav")).unwrap();
    assert_eq!(kombiniert.len(), 1600);
    assert_eq!(i16::from_le_bytes([kombiniert[0], kombiniert[1]]), 500);
    assert_eq!(i16::from_le_bytes([kombiniert[400], kombiniert[401]]), 1500);
}

#[tokio::test]
async fn test_ohne_outbound_keine_outbound_dateien() {
    let dir = tempfile::tempdir().unwrap();
    let bericht = test_aufnahme(false).speichern(dir.path());

    assert!(bericht.ist_vollstaendig());
    assert!(bericht.verzeichnis.join("inbound.wav").exists());
    assert!(!bericht.verzeichnis.join("outbound.wav").exists());
    assert!(!bericht.verzeichnis.join("combined.wav").exists());
}

#[tokio::test]
async fn test_ohne_audio_nur_transkripte() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = UtteranceLedger::neu(CallId("leer".into()), "X", "Y");
    let aufnahme = Aufnahme {
        transkript: ledger.export(),
        ausrichtung: AudioAusrichtung::new(),
    };

    let bericht = aufnahme.speichern(dir.path());
    assert_eq!(bericht.gespeichert, vec!["transcript.json", "transcript.txt"]);
}

#[tokio::test]
async fn test_ein_fehler_verhindert_nicht_die_uebrigen() {
    let dir = tempfile::tempdir().unwrap();
    // Ein Verzeichnis an Stelle der Textdatei laesst genau dieses Artefakt scheitern
    std::fs::create_dir_all(dir.path().join("test_call").join("transcript.txt")).unwrap();

    let bericht = test_aufnahme(true).speichern(dir.path());
    assert!(!bericht.ist_vollstaendig());
    assert_eq!(bericht.fehler.len(), 1);
    assert_eq!(bericht.fehler[0].0, "transcript.txt");
    assert_eq!(bericht.gespeichert.len(), 5);
    assert!(bericht.verzeichnis.join("combined.wav").exists());
}

#[tokio::test]
async fn test_json_artefakt_ist_wieder_lesbar() {
    let dir = tempfile::tempdir().unwrap();
    let aufnahme = test_aufnahme(false);
    let bericht = aufnahme.speichern(dir.path());

    let json = std::fs::read_to_string(bericht.verzeichnis.join("transcript.json")).unwrap();
    let gelesen = crate::TranskriptExport::aus_json(&json).unwrap();
    assert_eq!(gelesen, aufnahme.transkript);
}
