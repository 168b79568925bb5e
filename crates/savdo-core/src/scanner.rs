//! # Barcode Input Detector
//!
//! USB and Bluetooth barcode scanners act as keyboards ("keyboard wedge"):
//! they type the code character by character, much faster than a person,
//! and finish with Enter. This module tells the two apart using keystroke
//! timing alone.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │          char key                      char key (gap ≤ timeout)         │
//! │   ┌──────┐ ─────────────► ┌──────────────┐ ◄────┐                       │
//! │   │ Idle │                │ Accumulating │ ─────┘                       │
//! │   └──────┘ ◄───────────── └──────────────┘                             │
//! │       ▲    Enter (emit scan if 3..=50 chars, else discard)              │
//! │       │    gap > timeout / expire(now)                                  │
//! │       │    buffer past max_length                                       │
//! │       └─────────────────────────────────────────                        │
//! │                                                                         │
//! │  Ignored without touching the buffer or the timer:                      │
//! │    Shift/Control/Alt/Meta/CapsLock, F1–F12, Ctrl/Alt/Meta chords        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The detector never reads the clock. Every event carries its own
//! timestamp, and idle expiry is driven by the caller through
//! [`BarcodeDetector::expire`].

use std::time::{Duration, Instant};

// =============================================================================
// Settings
// =============================================================================

/// Timing and length limits for one scanner profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerSettings {
    /// Maximum gap between two keystrokes of the same scan.
    pub timeout: Duration,
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for ScannerSettings {
    /// Linear barcodes: EAN-13, UPC-A, Code 128.
    fn default() -> Self {
        ScannerSettings {
            timeout: Duration::from_millis(100),
            min_length: 3,
            max_length: 50,
        }
    }
}

impl ScannerSettings {
    /// QR labels carry JSON payloads, so they are longer and some 2D
    /// scanners type them more slowly.
    pub fn qr() -> Self {
        ScannerSettings {
            timeout: Duration::from_millis(150),
            min_length: 3,
            max_length: 100,
        }
    }
}

// =============================================================================
// Key Events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    /// F1 to F12.
    Function(u8),
    Shift,
    Control,
    Alt,
    Meta,
    CapsLock,
    /// Anything else (Tab, arrows, Escape).
    Other,
}

impl Key {
    /// Maps a DOM-style key name ("a", "Enter", "F5", "Shift").
    pub fn from_name(name: &str) -> Key {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::Char(c);
        }
        match name {
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Shift" => Key::Shift,
            "Control" => Key::Control,
            "Alt" => Key::Alt,
            "Meta" => Key::Meta,
            "CapsLock" => Key::CapsLock,
            _ => name
                .strip_prefix('F')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=12).contains(n))
                .map(Key::Function)
                .unwrap_or(Key::Other),
        }
    }

    fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::Shift | Key::Control | Key::Alt | Key::Meta | Key::CapsLock
        )
    }
}

/// Modifier keys held while the key was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Shift alone is how scanners type upper-case letters, so it does not
    /// make a chord.
    fn is_chord(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub at: Instant,
}

impl KeyEvent {
    pub fn new(key: Key, at: Instant) -> Self {
        KeyEvent {
            key,
            modifiers: Modifiers::default(),
            at,
        }
    }
}

// =============================================================================
// Detector
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Accumulating,
}

/// What the detector did with one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not ours. The key passes through untouched.
    Ignored,
    /// Added to (or removed from) the scan buffer.
    Buffered,
    /// Enter finished a scan. The caller must suppress the Enter.
    Scan(String),
    /// Enter or an overflow dropped a buffer that was not a valid scan.
    Discarded,
}

impl KeyOutcome {
    /// Whether the key was swallowed as part of a scan.
    pub fn is_consumed(&self) -> bool {
        matches!(self, KeyOutcome::Scan(_))
    }
}

#[derive(Debug, Clone)]
pub struct BarcodeDetector {
    settings: ScannerSettings,
    buffer: String,
    last_key_at: Option<Instant>,
}

impl BarcodeDetector {
    pub fn new(settings: ScannerSettings) -> Self {
        BarcodeDetector {
            settings,
            buffer: String::new(),
            last_key_at: None,
        }
    }

    pub fn settings(&self) -> ScannerSettings {
        self.settings
    }

    pub fn state(&self) -> DetectorState {
        if self.buffer.is_empty() {
            DetectorState::Idle
        } else {
            DetectorState::Accumulating
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Feeds one keystroke.
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        if event.key.is_modifier()
            || event.modifiers.is_chord()
            || matches!(event.key, Key::Function(_) | Key::Other)
        {
            return KeyOutcome::Ignored;
        }

        // A slow keystroke belongs to a person, so whatever came before it
        // was not a scan.
        self.expire(event.at);
        self.last_key_at = Some(event.at);

        match event.key {
            Key::Char(c) => {
                self.buffer.push(c);
                if self.buffer.chars().count() > self.settings.max_length {
                    self.reset();
                    return KeyOutcome::Discarded;
                }
                KeyOutcome::Buffered
            }
            Key::Backspace => {
                if self.buffer.pop().is_some() {
                    KeyOutcome::Buffered
                } else {
                    KeyOutcome::Ignored
                }
            }
            Key::Enter => self.finish(),
            _ => KeyOutcome::Ignored,
        }
    }

    /// Drops the buffer when the last keystroke is older than the timeout.
    /// Returns true when something was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_key_at else {
            return false;
        };
        if now.saturating_duration_since(last) <= self.settings.timeout {
            return false;
        }
        let dropped = !self.buffer.is_empty();
        self.reset();
        dropped
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_key_at = None;
    }

    fn finish(&mut self) -> KeyOutcome {
        if self.buffer.is_empty() {
            self.last_key_at = None;
            return KeyOutcome::Ignored;
        }

        let code = self.buffer.trim().to_string();
        self.reset();

        let len = code.chars().count();
        if (self.settings.min_length..=self.settings.max_length).contains(&len) {
            KeyOutcome::Scan(code)
        } else {
            KeyOutcome::Discarded
        }
    }
}

impl Default for BarcodeDetector {
    fn default() -> Self {
        BarcodeDetector::new(ScannerSettings::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: Duration = Duration::from_millis(20);

    /// Types `keys` with `gap` between each, returning every outcome.
    fn type_keys(
        detector: &mut BarcodeDetector,
        start: Instant,
        keys: &[Key],
        gap: Duration,
    ) -> Vec<KeyOutcome> {
        keys.iter()
            .enumerate()
            .map(|(i, key)| detector.handle_key(&KeyEvent::new(*key, start + gap * i as u32)))
            .collect()
    }

    fn chars(s: &str) -> Vec<Key> {
        s.chars().map(Key::Char).collect()
    }

    #[test]
    fn test_fast_keys_then_enter_emit_scan() {
        let mut detector = BarcodeDetector::default();
        let mut keys = chars("123");
        keys.push(Key::Enter);

        let outcomes = type_keys(&mut detector, Instant::now(), &keys, FAST);

        assert_eq!(outcomes.last(), Some(&KeyOutcome::Scan("123".to_string())));
        assert!(outcomes.last().unwrap().is_consumed());
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn test_slow_gap_resets_buffer() {
        let mut detector = BarcodeDetector::default();
        let t0 = Instant::now();

        detector.handle_key(&KeyEvent::new(Key::Char('1'), t0));
        detector.handle_key(&KeyEvent::new(Key::Char('2'), t0 + FAST));
        let late = t0 + FAST + Duration::from_millis(150);
        detector.handle_key(&KeyEvent::new(Key::Char('3'), late));
        assert_eq!(detector.buffer(), "3");

        let outcome = detector.handle_key(&KeyEvent::new(Key::Enter, late + FAST));
        assert_eq!(outcome, KeyOutcome::Discarded);
        assert!(!outcome.is_consumed());
    }

    #[test]
    fn test_too_short_is_discarded() {
        let mut detector = BarcodeDetector::default();
        let outcomes = type_keys(
            &mut detector,
            Instant::now(),
            &[Key::Char('4'), Key::Char('2'), Key::Enter],
            FAST,
        );
        assert_eq!(outcomes[2], KeyOutcome::Discarded);
    }

    #[test]
    fn test_overflow_drops_buffer() {
        let mut detector = BarcodeDetector::default();
        let keys = chars(&"7".repeat(51));
        let outcomes = type_keys(&mut detector, Instant::now(), &keys, FAST);

        assert_eq!(outcomes[49], KeyOutcome::Buffered);
        assert_eq!(outcomes[50], KeyOutcome::Discarded);
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn test_qr_profile_accepts_long_payloads() {
        let mut detector = BarcodeDetector::new(ScannerSettings::qr());
        let payload = r#"{"s":"ITEM-PACK-24","v":"1042","p":24,"extra":"padding-padding"}"#;
        let mut keys = chars(payload);
        keys.push(Key::Enter);

        let outcomes = type_keys(&mut detector, Instant::now(), &keys, Duration::from_millis(120));
        assert_eq!(outcomes.last(), Some(&KeyOutcome::Scan(payload.to_string())));
    }

    #[test]
    fn test_modifiers_and_function_keys_are_ignored() {
        let mut detector = BarcodeDetector::default();
        let t0 = Instant::now();

        detector.handle_key(&KeyEvent::new(Key::Char('A'), t0));
        assert_eq!(
            detector.handle_key(&KeyEvent::new(Key::Shift, t0 + FAST)),
            KeyOutcome::Ignored
        );
        assert_eq!(
            detector.handle_key(&KeyEvent::new(Key::Function(5), t0 + FAST * 2)),
            KeyOutcome::Ignored
        );

        let chord = KeyEvent {
            key: Key::Char('c'),
            modifiers: Modifiers {
                ctrl: true,
                ..Default::default()
            },
            at: t0 + FAST * 3,
        };
        assert_eq!(detector.handle_key(&chord), KeyOutcome::Ignored);

        let shifted = KeyEvent {
            key: Key::Char('B'),
            modifiers: Modifiers {
                shift: true,
                ..Default::default()
            },
            at: t0 + FAST * 4,
        };
        assert_eq!(detector.handle_key(&shifted), KeyOutcome::Buffered);
        assert_eq!(detector.buffer(), "AB");
    }

    #[test]
    fn test_backspace_pops_last_char() {
        let mut detector = BarcodeDetector::default();
        let keys = [
            Key::Char('A'),
            Key::Char('B'),
            Key::Char('X'),
            Key::Backspace,
            Key::Char('C'),
            Key::Enter,
        ];
        let outcomes = type_keys(&mut detector, Instant::now(), &keys, FAST);
        assert_eq!(outcomes[5], KeyOutcome::Scan("ABC".to_string()));
    }

    #[test]
    fn test_plain_enter_passes_through() {
        let mut detector = BarcodeDetector::default();
        let outcome = detector.handle_key(&KeyEvent::new(Key::Enter, Instant::now()));
        assert_eq!(outcome, KeyOutcome::Ignored);
    }

    #[test]
    fn test_expire_returns_to_idle() {
        let mut detector = BarcodeDetector::default();
        let t0 = Instant::now();
        detector.handle_key(&KeyEvent::new(Key::Char('9'), t0));

        assert!(!detector.expire(t0 + Duration::from_millis(50)));
        assert_eq!(detector.state(), DetectorState::Accumulating);

        assert!(detector.expire(t0 + Duration::from_millis(101)));
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("a"), Key::Char('a'));
        assert_eq!(Key::from_name("Enter"), Key::Enter);
        assert_eq!(Key::from_name("F12"), Key::Function(12));
        assert_eq!(Key::from_name("F13"), Key::Other);
        assert_eq!(Key::from_name("Meta"), Key::Meta);
        assert_eq!(Key::from_name("ArrowUp"), Key::Other);
    }
}
