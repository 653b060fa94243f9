//! End-to-end producer tests against a real child process
//!
//! The "recognizer" is a tiny shell script speaking the JSON-lines protocol,
//! which exercises process spawning, profile hand-over through the
//! environment, prompt forwarding over stdin, and end-of-stream handling.
//! Scripts that block on stdin rely on the forwarder to make progress.

#![cfg(unix)]

use std::time::Duration;

use medlive_engine::{CommandLauncher, EngineAdapter, EngineError, EngineProfile, TranscriptEvent};

fn shell(script: &str) -> CommandLauncher {
    CommandLauncher::new("sh", vec!["-c".to_string(), script.to_string()])
}

#[test]
fn test_profile_passed_through_environment() {
    let mut launcher = shell(
        r#"printf '{"type":"final","text":"%s %s %s"}\n' "$MEDLIVE_MODEL" "$MEDLIVE_COMPUTE_TYPE" "$MEDLIVE_LANGUAGE""#,
    );
    let profile = EngineProfile::select(Some("NVIDIA GeForce RTX 4090"));
    let mut adapter = EngineAdapter::start(&mut launcher, &profile).unwrap();

    assert_eq!(
        adapter.next_event().unwrap(),
        Some(TranscriptEvent::Final("large-v3 float16 de".into()))
    );
    assert_eq!(adapter.next_event().unwrap(), None);
    assert!(matches!(adapter.next_event(), Err(EngineError::Terminated)));
}

#[test]
fn test_prompt_forwarded_to_process_stdin() {
    // Echo the first stdin line back as a final record
    let mut launcher = shell(r#"read -r line; printf '%s\n' "$line" | sed 's/set_prompt/final/'"#);
    let mut adapter = EngineAdapter::start(&mut launcher, &EngineProfile::select(None)).unwrap();

    adapter.set_prompt("Kardiologie, Echokardiographie");

    assert_eq!(
        adapter.next_event().unwrap(),
        Some(TranscriptEvent::Final("Kardiologie, Echokardiographie".into()))
    );
}

#[test]
fn test_partial_then_final_sequence() {
    let mut launcher = shell(
        r#"printf '%s\n' '{"type":"partial","text":"Patient zeigt"}' 'noise' '{"type":"final","text":"Patient zeigt Symptome."}'"#,
    );
    let mut adapter = EngineAdapter::start(&mut launcher, &EngineProfile::select(None)).unwrap();

    assert_eq!(
        adapter.next_event().unwrap(),
        Some(TranscriptEvent::Partial("Patient zeigt".into()))
    );
    assert_eq!(
        adapter.next_event().unwrap(),
        Some(TranscriptEvent::Final("Patient zeigt Symptome.".into()))
    );
    assert_eq!(adapter.next_event().unwrap(), None);
}

#[test]
fn test_prompt_reaches_idle_recognizer() {
    // Announce readiness, then wait for a prompt before saying anything else
    let mut launcher = shell(
        r#"echo '{"type":"partial","text":"bereit"}'; read -r line; printf '%s\n' "$line" | sed 's/set_prompt/final/'"#,
    );
    let mut adapter = EngineAdapter::start(&mut launcher, &EngineProfile::select(None)).unwrap();
    assert_eq!(adapter.next_event().unwrap(), Some(TranscriptEvent::Partial("bereit".into())));

    // Written while the worker is already blocked on the next read
    let prompt = adapter.prompt();
    let writer = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        prompt.set("Orthopädie");
    });

    assert_eq!(
        adapter.next_event().unwrap(),
        Some(TranscriptEvent::Final("Orthopädie".into()))
    );
    writer.join().unwrap();
}

#[test]
fn test_closed_recognizer_stdin_does_not_stop_transcripts() {
    let mut launcher = shell(
        r#"exec 0<&-; echo '{"type":"final","text":"Erster Befund."}'; sleep 0.3; printf '%s\n' '{"type":"final","text":"Zweiter Befund."}' '{"type":"final","text":"Dritter Befund."}'"#,
    );
    let mut adapter = EngineAdapter::start(&mut launcher, &EngineProfile::select(None)).unwrap();
    assert_eq!(
        adapter.next_event().unwrap(),
        Some(TranscriptEvent::Final("Erster Befund.".into()))
    );

    adapter.set_prompt("Kardiologie");

    assert_eq!(
        adapter.next_event().unwrap(),
        Some(TranscriptEvent::Final("Zweiter Befund.".into()))
    );
    assert_eq!(
        adapter.next_event().unwrap(),
        Some(TranscriptEvent::Final("Dritter Befund.".into()))
    );
    assert_eq!(adapter.next_event().unwrap(), None);
}
