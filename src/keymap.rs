// Computer keyboard layout for the one-octave piano: the home row plays the
// white keys and the row above it the black keys.

pub const COMPUTER_KEYS: [&str; 12] = ["a", "w", "s", "e", "d", "f", "t", "g", "y", "h", "u", "j"];

#[inline]
pub fn computer_key_index(key: &str) -> Option<usize> {
    if key.chars().count() != 1 {
        return None;
    }
    let lower = key.to_ascii_lowercase();
    COMPUTER_KEYS.iter().position(|k| *k == lower)
}
