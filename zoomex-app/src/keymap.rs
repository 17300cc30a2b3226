use winit::keyboard::KeyCode;

/// Keyboard-to-cell mapping for the 8x3 grid, row-major. QWERTY rows with a
/// gap in the middle so both hands rest on the home position.
pub const KEY_ORDER: [KeyCode; 24] = [
    KeyCode::KeyQ,
    KeyCode::KeyW,
    KeyCode::KeyE,
    KeyCode::KeyR,
    KeyCode::KeyU,
    KeyCode::KeyI,
    KeyCode::KeyO,
    KeyCode::KeyP,
    KeyCode::KeyA,
    KeyCode::KeyS,
    KeyCode::KeyD,
    KeyCode::KeyF,
    KeyCode::KeyJ,
    KeyCode::KeyK,
    KeyCode::KeyL,
    KeyCode::Semicolon,
    KeyCode::KeyZ,
    KeyCode::KeyX,
    KeyCode::KeyC,
    KeyCode::KeyV,
    KeyCode::KeyN,
    KeyCode::KeyM,
    KeyCode::Comma,
    KeyCode::Period,
];

/// Captions drawn on the grid cells, matching `KEY_ORDER`.
pub const KEY_LABELS: [&str; 24] = [
    "Q", "W", "E", "R", "U", "I", "O", "P", "A", "S", "D", "F", "J", "K", "L", ";", "Z", "X",
    "C", "V", "N", "M", ",", ".",
];

/// Flat cell index for a pressed key, if it belongs to the grid.
pub fn cell_for_key(code: KeyCode) -> Option<usize> {
    KEY_ORDER.iter().position(|key| *key == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_grid_cell_has_exactly_one_key() {
        assert_eq!(KEY_ORDER.len(), 24);
        assert_eq!(KEY_LABELS.len(), 24);
        for (index, key) in KEY_ORDER.iter().enumerate() {
            assert_eq!(cell_for_key(*key), Some(index));
        }
    }

    #[test]
    fn unmapped_keys_select_nothing() {
        assert_eq!(cell_for_key(KeyCode::Space), None);
        assert_eq!(cell_for_key(KeyCode::KeyT), None);
        assert_eq!(cell_for_key(KeyCode::Digit1), None);
    }
}
