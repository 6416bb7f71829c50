// Host-side tests for the computer-keyboard layout.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod keymap {
    include!("../src/keymap.rs");
}

use keymap::*;

#[test]
fn home_row_plays_the_white_keys() {
    // C D E F G A B
    let white = [0, 2, 4, 5, 7, 9, 11];
    for (key, idx) in ["a", "s", "d", "f", "g", "h", "j"].iter().zip(white) {
        assert_eq!(computer_key_index(key), Some(idx), "key {}", key);
    }
}

#[test]
fn upper_row_plays_the_black_keys() {
    // C# D# F# G# A#
    let black = [1, 3, 6, 8, 10];
    for (key, idx) in ["w", "e", "t", "y", "u"].iter().zip(black) {
        assert_eq!(computer_key_index(key), Some(idx), "key {}", key);
    }
}

#[test]
fn shifted_letters_play_the_same_key() {
    assert_eq!(computer_key_index("A"), computer_key_index("a"));
    assert_eq!(computer_key_index("J"), Some(11));
}

#[test]
fn unmapped_and_named_keys_are_ignored() {
    for key in ["q", "r", "k", "z", "1", " ", "", "Shift", "Enter", "ArrowLeft"] {
        assert_eq!(computer_key_index(key), None, "key {:?}", key);
    }
}

#[test]
fn layout_covers_the_octave_once() {
    assert_eq!(COMPUTER_KEYS.len(), 12);
    for (i, a) in COMPUTER_KEYS.iter().enumerate() {
        assert_eq!(computer_key_index(a), Some(i));
    }
}
