//! End-to-end keyboard tests: scan-code bytes in, events out.
//!
//! Drives `KeyboardHandler` with the built-in US table the way a console
//! device would, with a fake LED collaborator standing in for the ioctls.

use std::io;

use spark_console_input::keymap::symbols as sym;
use spark_console_input::{
    HostModifiers, InputEvent, KeyEvent, KeyboardHandler, KeycodeAction, Keymap, LedControl, Leds,
    NoLeds, ReadStatus,
};

// =============================================================================
// FAKES
// =============================================================================

#[derive(Default)]
struct Panel {
    leds: Leds,
    writes: usize,
}

impl LedControl for Panel {
    fn leds(&mut self) -> io::Result<Leds> {
        Ok(self.leds)
    }

    fn set_leds(&mut self, leds: Leds) -> io::Result<()> {
        self.leds = leds;
        self.writes += 1;
        Ok(())
    }
}

/// LED panel whose state can be written but not queried.
struct WriteOnlyPanel {
    leds: Leds,
    writes: Vec<Leds>,
}

impl LedControl for WriteOnlyPanel {
    fn leds(&mut self) -> io::Result<Leds> {
        Err(io::Error::other("KDGETLED not permitted"))
    }

    fn set_leds(&mut self, leds: Leds) -> io::Result<()> {
        self.leds = leds;
        self.writes.push(leds);
        Ok(())
    }
}

/// Hands out its bytes in small reads, then would-block.
struct Device {
    bytes: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl io::Read for Device {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.bytes.len() {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let n = self.chunk.min(buf.len()).min(self.bytes.len() - self.pos);
        buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

const RELEASE: u8 = 0x80;

fn tap(code: u8) -> [u8; 2] {
    [code, code | RELEASE]
}

fn presses(events: &[InputEvent]) -> Vec<KeyEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            InputEvent::Key(k) if k.pressed => Some(*k),
            _ => None,
        })
        .collect()
}

fn text(events: &[InputEvent]) -> String {
    presses(events).iter().filter_map(|k| k.unicode).collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_typing_with_shift() {
    let mut kb = KeyboardHandler::new(NoLeds, Vec::new());
    let mut bytes = vec![42];
    bytes.extend(tap(35)); // h
    bytes.push(42 | RELEASE);
    bytes.extend(tap(23)); // i
    bytes.push(42);
    bytes.extend(tap(2)); // !
    bytes.push(42 | RELEASE);

    let mut dev = Device { bytes, pos: 0, chunk: 3 };
    assert_eq!(kb.read_available(&mut dev), ReadStatus::Drained);
    assert_eq!(text(kb.sink()), "Hi!");

    // Only the three character keys report, press and release each.
    assert_eq!(kb.sink().len(), 6);
}

#[test]
fn test_caps_lock_letters_only_and_led() {
    let mut kb = KeyboardHandler::new(Panel::default(), Vec::new());
    for b in tap(58) {
        kb.process_byte(b);
    }
    assert!(kb.state().locks.caps_lock);
    assert_eq!(kb.leds().leds, Leds::CAPS_LOCK);

    for code in [30, 2, 31] {
        for b in tap(code) {
            kb.process_byte(b);
        }
    }
    assert_eq!(text(kb.sink()), "A1S");

    // Shift under CapsLock gives lowercase letters back.
    kb.process_byte(42);
    kb.process_byte(30);
    let last = *presses(kb.sink()).last().unwrap();
    assert_eq!(last.unicode, Some('a'));
    assert!(last.modifiers.is_empty());
}

#[test]
fn test_lock_autorepeat_never_toggles() {
    let mut kb = KeyboardHandler::new(Panel::default(), Vec::new());
    assert_eq!(kb.process_keycode(69, true, false), KeycodeAction::NumLock(true));
    for _ in 0..5 {
        assert_eq!(kb.process_keycode(69, true, true), KeycodeAction::None);
    }
    kb.process_keycode(69, false, false);
    assert!(kb.state().locks.num_lock);
    assert_eq!(kb.leds().writes, 1);
    assert!(kb.sink().is_empty());
}

#[test]
fn test_keypad_navigation_without_numlock() {
    let mut kb = KeyboardHandler::new(Panel::default(), Vec::new());
    let expected = [
        (71, sym::HOME),
        (72, sym::UP),
        (73, sym::PAGE_UP),
        (75, sym::LEFT),
        (76, sym::CLEAR),
        (77, sym::RIGHT),
        (79, sym::END),
        (80, sym::DOWN),
        (81, sym::PAGE_DOWN),
        (82, sym::INSERT),
        (83, sym::DELETE),
    ];
    for (code, _) in expected {
        kb.process_byte(code);
    }
    let got = presses(kb.sink());
    assert_eq!(got.len(), expected.len());
    for (ev, (code, symbol)) in got.iter().zip(expected) {
        assert_eq!(ev.native_code, u16::from(code));
        assert_eq!(ev.symbol, symbol, "code {}", code);
        assert_eq!(ev.unicode, None);
        assert!(ev.modifiers.contains(HostModifiers::KEYPAD));
    }
}

#[test]
fn test_shifted_keypad_navigation_keeps_shift() {
    let mut kb = KeyboardHandler::new(Panel::default(), Vec::new());
    kb.process_byte(42);
    kb.process_byte(71);
    kb.process_byte(79);
    let got = presses(kb.sink());
    assert_eq!(got.len(), 2);
    for (ev, symbol) in got.iter().zip([sym::HOME, sym::END]) {
        assert_eq!(ev.symbol, symbol);
        assert_eq!(ev.unicode, None);
        assert_eq!(ev.modifiers, HostModifiers::SHIFT | HostModifiers::KEYPAD);
    }
}

#[test]
fn test_unreadable_leds_are_cleared_on_start() {
    let panel = WriteOnlyPanel { leds: Leds::all(), writes: Vec::new() };
    let kb = KeyboardHandler::new(panel, Vec::new());
    assert!(!kb.state().locks.caps_lock);
    assert!(!kb.state().locks.num_lock);
    assert!(!kb.state().locks.scroll_lock);
    assert_eq!(kb.leds().leds, Leds::empty());
    assert_eq!(kb.leds().writes, vec![Leds::empty()]);
}

#[test]
fn test_keypad_digits_with_numlock_from_leds() {
    let panel = Panel { leds: Leds::NUM_LOCK, writes: 0 };
    let mut kb = KeyboardHandler::new(panel, Vec::new());
    for code in [71, 72, 73, 75, 76, 77, 79, 80, 81, 82, 83] {
        kb.process_byte(code);
    }
    assert_eq!(text(kb.sink()), "7894561230.");
}

#[test]
fn test_dead_key_composition() {
    let mut kb = KeyboardHandler::new(NoLeds, Vec::new());
    kb.set_keymap(Keymap::builtin().with_compose(true));

    // AltGr + ' is dead acute, then e.
    kb.process_byte(93);
    kb.process_byte(40);
    kb.process_byte(40 | RELEASE);
    kb.process_byte(93 | RELEASE);
    kb.process_byte(18);

    let got = presses(kb.sink());
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].unicode, Some('é'));
    assert_eq!(got[0].symbol, sym::UNKNOWN);
}

#[test]
fn test_dead_key_fallbacks() {
    let mut kb = KeyboardHandler::new(NoLeds, Vec::new());
    kb.set_keymap(Keymap::builtin().with_compose(true));

    // Dead grave then q: no composition, the bare accent comes out.
    kb.process_byte(93);
    kb.process_byte(41);
    kb.process_byte(93 | RELEASE);
    kb.process_byte(16);
    // Dead grave twice: cancelled, one accent event.
    kb.process_byte(93);
    kb.process_byte(41);
    kb.process_byte(41);
    kb.process_byte(93 | RELEASE);

    let got = presses(kb.sink());
    assert_eq!(got.len(), 2);
    assert!(got.iter().all(|k| k.unicode == Some('`') && k.symbol == sym::UNKNOWN));
}

#[test]
fn test_compose_key() {
    let mut kb = KeyboardHandler::new(NoLeds, Vec::new());
    kb.set_keymap(Keymap::builtin().with_compose(true));

    for code in [105, 30, 18, 105, 44] {
        kb.process_byte(code);
        kb.process_byte(code | RELEASE);
    }
    // Compose a e gives æ; Compose z abandons and types z.
    assert_eq!(text(kb.sink()), "æz");
}

#[test]
fn test_builtin_table_ignores_dead_keys() {
    let mut kb = KeyboardHandler::new(NoLeds, Vec::new());
    kb.process_byte(93);
    kb.process_byte(40);
    let got = presses(kb.sink());
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].symbol, sym::DEAD_ACUTE);
}

#[test]
fn test_console_switching() {
    let mut kb = KeyboardHandler::new(NoLeds, Vec::new());
    kb.process_byte(56);
    assert_eq!(kb.process_byte(61), KeycodeAction::SwitchConsole(2));
    assert_eq!(kb.process_byte(97), KeycodeAction::PreviousConsole);
    assert_eq!(kb.process_byte(98), KeycodeAction::NextConsole);
    kb.process_byte(56 | RELEASE);
    assert_eq!(kb.process_byte(61), KeycodeAction::None);

    assert_eq!(
        kb.sink().as_slice(),
        &[
            InputEvent::System(KeycodeAction::SwitchConsole(2)),
            InputEvent::System(KeycodeAction::PreviousConsole),
            InputEvent::System(KeycodeAction::NextConsole),
            InputEvent::Key(KeyEvent {
                native_code: 61,
                unicode: None,
                symbol: sym::function(3),
                modifiers: HostModifiers::empty(),
                pressed: true,
                autorepeat: false,
            }),
        ]
    );
}

#[test]
fn test_unmapped_codes_are_silent() {
    let mut kb = KeyboardHandler::new(NoLeds, Vec::new());
    for code in [0, 84, 85, 86, 108, 127] {
        for b in tap(code) {
            kb.process_byte(b);
        }
    }
    assert!(kb.sink().is_empty());
}

#[test]
fn test_eof_ends_reading() {
    struct Gone;
    impl io::Read for Gone {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }
    let mut kb = KeyboardHandler::new(NoLeds, Vec::new());
    assert_eq!(kb.read_available(&mut Gone), ReadStatus::Closed);
}
