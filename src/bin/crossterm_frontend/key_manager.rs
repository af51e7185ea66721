use super::key_state::KeyState;
use crossterm::event::{self, Event, KeyCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const HOLD: Duration = Duration::from_millis(250);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A struct for managing keypresses that will automatically
/// start a thread that grabs keypresses.
pub struct KeyManager {
    stop: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
    keys: Arc<KeyState>,
    event_listener: Option<JoinHandle<()>>,
}

impl KeyManager {
    // Start event listener thread
    pub fn new() -> KeyManager {
        let stop = Arc::new(AtomicBool::new(false));
        let quit = Arc::new(AtomicBool::new(false));
        let keys = Arc::new(KeyState::new(HOLD));
        let event_listener = event_listener(stop.clone(), quit.clone(), keys.clone());
        KeyManager {
            stop,
            quit,
            keys,
            event_listener: Some(event_listener),
        }
    }

    pub fn keys(&self) -> Arc<KeyState> {
        self.keys.clone()
    }

    /// Whether the user asked to leave.
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }
}

impl Drop for KeyManager {
    fn drop(&mut self) {
        // Tell the event listener to stop, and wait for it
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.event_listener.take() {
            let _ = handle.join();
        }
    }
}

/// Starts a thread that listens for key events and records them in the key state.
fn event_listener(stop: Arc<AtomicBool>, quit: Arc<AtomicBool>, keys: Arc<KeyState>) -> JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    log::warn!("Could not poll for events: {}", error);
                    break;
                }
            }

            // Investigate the event
            match event::read() {
                Ok(Event::Key(key_event)) if key_event.code == KeyCode::Esc => {
                    quit.store(true, Ordering::Relaxed);
                }
                Ok(Event::Key(key_event)) => {
                    if let Some(key) = key_to_u8(key_event.code) {
                        keys.press(key);
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    log::warn!("Could not read event: {}", error);
                    break;
                }
            }
        }
    })
}

/// Map the left side of a QWERTY keyboard onto the hexadecimal keypad.
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r  ->  4 5 6 D
/// a s d f      7 8 9 E
/// z x c v      A 0 B F
/// ```
pub fn key_to_u8(key: KeyCode) -> Option<u8> {
    let c = match key {
        KeyCode::Char(c) => c.to_ascii_lowercase(),
        _ => return None,
    };
    let key = match c {
        '1' => 0x1,
        '2' => 0x2,
        '3' => 0x3,
        '4' => 0xC,
        'q' => 0x4,
        'w' => 0x5,
        'e' => 0x6,
        'r' => 0xD,
        'a' => 0x7,
        's' => 0x8,
        'd' => 0x9,
        'f' => 0xE,
        'z' => 0xA,
        'x' => 0x0,
        'c' => 0xB,
        'v' => 0xF,
        _ => return None,
    };
    Some(key)
}
