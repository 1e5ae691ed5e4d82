//=========================================================================
// State Tracker
//=========================================================================
//
// Low-level input state with per-frame deltas.
//
// Architecture:
//   InputEvent → advance_frame() → HashSet (keys/buttons held) → query
//                                └→ clicks (pointer position at press)
//
// Frame lifecycle: clear() → process_events() → query
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== StateTracker ========================================================

/// Keyboard and pointer state visible to scenes.
///
/// Persistent state (held keys, pointer position) survives frame
/// boundaries. Per-frame deltas (pressed, released, clicks) are reset at
/// the start of every frame.
pub struct StateTracker {
    //--- Persistent State -------------------------------------------------
    keys_down: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    pointer: (f32, f32),
    modifiers: Modifiers,

    //--- Frame Deltas -----------------------------------------------------
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    buttons_pressed: HashSet<MouseButton>,
    clicks: Vec<(f32, f32)>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            buttons_down: HashSet::new(),
            pointer: (0.0, 0.0),
            modifiers: Modifiers::NONE,
            keys_pressed: HashSet::new(),
            keys_released: HashSet::new(),
            buttons_pressed: HashSet::new(),
            clicks: Vec::new(),
        }
    }

    //--- Frame Processing -------------------------------------------------

    /// Starts a new frame and applies every batch collected for it.
    pub(crate) fn advance_frame(&mut self, batches: &[Vec<InputEvent>]) {
        self.clear();
        for batch in batches {
            self.process_events(batch);
        }
    }

    /// Resets per-frame deltas.
    pub(crate) fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.clicks.clear();
    }

    pub(crate) fn process_events(&mut self, events: &[InputEvent]) {
        for event in events {
            self.process_event(event);
        }
    }

    fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown { key, modifiers } => {
                self.modifiers = *modifiers;
                // Held keys repeat KeyDown; only the first counts as a press.
                if self.keys_down.insert(*key) {
                    self.keys_pressed.insert(*key);
                }
            }

            InputEvent::KeyUp { key, modifiers } => {
                self.modifiers = *modifiers;
                if self.keys_down.remove(key) {
                    self.keys_released.insert(*key);
                }
            }

            InputEvent::MouseButtonDown { button, modifiers } => {
                self.modifiers = *modifiers;
                if self.buttons_down.insert(*button) {
                    self.buttons_pressed.insert(*button);
                    if *button == MouseButton::Left {
                        self.clicks.push(self.pointer);
                    }
                }
            }

            InputEvent::MouseButtonUp { button, modifiers } => {
                self.modifiers = *modifiers;
                self.buttons_down.remove(button);
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer = (*x, *y);
            }

            InputEvent::Unidentified => {}
        }
    }

    //--- Query API: Keyboard ----------------------------------------------

    /// `true` only on the frame the key went down.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    //--- Query API: Pointer -----------------------------------------------

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Last known pointer position in window coordinates.
    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    /// Pointer positions of primary-button presses this frame, oldest first.
    pub fn clicks(&self) -> &[(f32, f32)] {
        &self.clicks
    }

    //--- Query API: Modifiers ---------------------------------------------

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //--- Test Helpers -----------------------------------------------------

    fn key_down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown { key, modifiers: Modifiers::NONE }
    }

    fn key_up(key: KeyCode) -> InputEvent {
        InputEvent::KeyUp { key, modifiers: Modifiers::NONE }
    }

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::MouseButtonDown { button, modifiers: Modifiers::NONE }
    }

    fn release(button: MouseButton) -> InputEvent {
        InputEvent::MouseButtonUp { button, modifiers: Modifiers::NONE }
    }

    fn pointer(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved { x, y }
    }

    //--- Keyboard ---------------------------------------------------------

    #[test]
    fn key_pressed_only_on_transition_frame() {
        let mut tracker = StateTracker::new();

        tracker.advance_frame(&[vec![key_down(KeyCode::Enter)]]);
        assert!(tracker.is_key_pressed(KeyCode::Enter));
        assert!(tracker.is_key_down(KeyCode::Enter));

        tracker.advance_frame(&[]);
        assert!(!tracker.is_key_pressed(KeyCode::Enter));
        assert!(tracker.is_key_down(KeyCode::Enter));

        tracker.advance_frame(&[vec![key_up(KeyCode::Enter)]]);
        assert!(!tracker.is_key_down(KeyCode::Enter));
        assert!(tracker.is_key_released(KeyCode::Enter));
    }

    #[test]
    fn repeated_key_down_is_not_a_new_press() {
        let mut tracker = StateTracker::new();
        tracker.advance_frame(&[vec![key_down(KeyCode::Escape)]]);
        tracker.advance_frame(&[vec![key_down(KeyCode::Escape)]]);

        assert!(!tracker.is_key_pressed(KeyCode::Escape));
        assert!(tracker.is_key_down(KeyCode::Escape));
    }

    #[test]
    fn key_up_without_down_is_ignored() {
        let mut tracker = StateTracker::new();
        tracker.advance_frame(&[vec![key_up(KeyCode::Space)]]);
        assert!(!tracker.is_key_released(KeyCode::Space));
    }

    #[test]
    fn modifiers_follow_latest_key_event() {
        let mut tracker = StateTracker::new();
        tracker.advance_frame(&[vec![InputEvent::KeyDown {
            key: KeyCode::Tab,
            modifiers: Modifiers::SHIFT,
        }]]);
        assert_eq!(tracker.modifiers(), Modifiers::SHIFT);
    }

    //--- Pointer ----------------------------------------------------------

    #[test]
    fn click_records_pointer_position_at_press() {
        let mut tracker = StateTracker::new();
        tracker.advance_frame(&[
            vec![pointer(65.0, 97.0)],
            vec![press(MouseButton::Left), release(MouseButton::Left)],
        ]);

        assert_eq!(tracker.clicks(), &[(65.0, 97.0)]);
        assert!(tracker.is_button_pressed(MouseButton::Left));
        assert!(!tracker.is_button_down(MouseButton::Left));
    }

    #[test]
    fn multiple_clicks_keep_order() {
        let mut tracker = StateTracker::new();
        tracker.advance_frame(&[vec![
            pointer(1.0, 1.0),
            press(MouseButton::Left),
            release(MouseButton::Left),
            pointer(5.0, 9.0),
            press(MouseButton::Left),
        ]]);

        assert_eq!(tracker.clicks(), &[(1.0, 1.0), (5.0, 9.0)]);
    }

    #[test]
    fn secondary_button_does_not_click() {
        let mut tracker = StateTracker::new();
        tracker.advance_frame(&[vec![press(MouseButton::Right)]]);

        assert!(tracker.clicks().is_empty());
        assert!(tracker.is_button_pressed(MouseButton::Right));
    }

    #[test]
    fn clicks_reset_each_frame_but_pointer_persists() {
        let mut tracker = StateTracker::new();
        tracker.advance_frame(&[vec![pointer(3.0, 4.0), press(MouseButton::Left)]]);
        tracker.advance_frame(&[]);

        assert!(tracker.clicks().is_empty());
        assert_eq!(tracker.pointer(), (3.0, 4.0));
    }

    #[test]
    fn unidentified_events_are_ignored() {
        let mut tracker = StateTracker::new();
        tracker.advance_frame(&[vec![InputEvent::Unidentified]]);
        assert_eq!(tracker.pointer(), (0.0, 0.0));
        assert!(tracker.clicks().is_empty());
    }
}
