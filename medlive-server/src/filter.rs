//! Noise filtering for transcript events
//!
//! Whisper-style recognizers hallucinate stock phrases on silence or
//! background noise. Partial results matching one of those phrases are
//! dropped, and finals too short to carry content never reach clients.

use std::collections::HashSet;

use medlive_broadcaster::ServerMessage;
use medlive_engine::TranscriptEvent;

/// Boilerplate phrases suppressed in partial results
pub const DEFAULT_SUPPRESSED_PHRASES: &[&str] = &["befundbericht.", "bericht.", "www.", "vielen dank."];

/// Finals with this many characters or fewer (after trimming) are dropped
pub const DEFAULT_MIN_FINAL_CHARS: usize = 3;

#[derive(Debug, Clone)]
pub struct NoiseFilter {
    phrases: HashSet<String>,
    min_final_chars: usize,
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl NoiseFilter {
    pub fn new<I, S>(phrases: I, min_final_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
            min_final_chars,
        }
    }

    /// Whether a partial result is boilerplate
    pub fn should_suppress(&self, raw_text: &str) -> bool {
        self.phrases.contains(&normalize(raw_text))
    }

    /// Map an engine event to the message clients should see, if any
    ///
    /// Partials are forwarded verbatim unless they are boilerplate. Finals are
    /// trimmed and forwarded only when longer than `min_final_chars`.
    pub fn admit(&self, event: TranscriptEvent) -> Option<ServerMessage> {
        match event {
            TranscriptEvent::Partial(text) => {
                if self.should_suppress(&text) {
                    None
                } else {
                    Some(ServerMessage::Partial { text })
                }
            }
            TranscriptEvent::Final(text) => {
                let cleaned = text.trim();
                if cleaned.chars().count() <= self.min_final_chars {
                    None
                } else {
                    Some(ServerMessage::final_text(cleaned))
                }
            }
        }
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSED_PHRASES.iter().copied(), DEFAULT_MIN_FINAL_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suppresses_boilerplate() {
        let filter = NoiseFilter::default();
        assert!(filter.should_suppress("Vielen Dank."));
        assert!(filter.should_suppress("  vielen dank.  "));
        assert!(filter.should_suppress("BEFUNDBERICHT."));
        assert!(filter.should_suppress("www."));
        assert!(filter.should_suppress("Bericht.\n"));
    }

    #[test]
    fn test_keeps_real_speech() {
        let filter = NoiseFilter::default();
        assert!(!filter.should_suppress("Vielen Dank"));
        assert!(!filter.should_suppress("Vielen Dank für die Überweisung."));
        assert!(!filter.should_suppress("Patient zeigt"));
        assert!(!filter.should_suppress(""));
    }

    #[test]
    fn test_partial_forwarded_verbatim() {
        let filter = NoiseFilter::default();
        assert_eq!(
            filter.admit(TranscriptEvent::Partial(" Patient zeigt".into())),
            Some(ServerMessage::partial(" Patient zeigt"))
        );
        assert_eq!(filter.admit(TranscriptEvent::Partial("Vielen Dank.".into())), None);
    }

    #[test]
    fn test_suppression_applies_to_partials_only() {
        let filter = NoiseFilter::default();
        assert_eq!(
            filter.admit(TranscriptEvent::Final("Vielen Dank.".into())),
            Some(ServerMessage::final_text("Vielen Dank."))
        );
    }

    #[test]
    fn test_final_length_gate() {
        let filter = NoiseFilter::default();
        assert_eq!(filter.admit(TranscriptEvent::Final("Ok.".into())), None);
        assert_eq!(filter.admit(TranscriptEvent::Final("   ".into())), None);
        assert_eq!(filter.admit(TranscriptEvent::Final("  Ja.  ".into())), None);
        assert_eq!(
            filter.admit(TranscriptEvent::Final("Nein.".into())),
            Some(ServerMessage::final_text("Nein."))
        );
        assert_eq!(
            filter.admit(TranscriptEvent::Final("Patient zeigt Symptome.".into())),
            Some(ServerMessage::final_text("Patient zeigt Symptome."))
        );
    }

    #[test]
    fn test_final_length_counts_characters() {
        let filter = NoiseFilter::default();
        // 3 characters, 6 bytes
        assert_eq!(filter.admit(TranscriptEvent::Final("äöü".into())), None);
        assert!(filter.admit(TranscriptEvent::Final("Ödem".into())).is_some());
    }

    #[test]
    fn test_final_is_trimmed() {
        let filter = NoiseFilter::default();
        assert_eq!(
            filter.admit(TranscriptEvent::Final("  Weiterer Befund. \n".into())),
            Some(ServerMessage::final_text("Weiterer Befund."))
        );
    }

    #[test]
    fn test_custom_phrases() {
        let filter = NoiseFilter::new(["Untertitel im Auftrag des ZDF.", "  "], 5);
        assert!(filter.should_suppress("untertitel im auftrag des zdf."));
        assert!(!filter.should_suppress("vielen dank."));
        assert!(!filter.should_suppress(" "));
        assert_eq!(filter.admit(TranscriptEvent::Final("Nein.".into())), None);
    }
}
