//! Letter ↔ tile index mapping for DNA/properties strings
//!
//! Each character of a DNA or properties string selects one tile of the sprite
//! sheet bound to that position. `'0'` always selects the first tile; any other
//! letter is taken by its alphabet position, shifted by one and wrapped over
//! the number of available tiles.

const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Convert a genome letter to a 0-based index among `total` entries.
///
/// Returns `None` when there is nothing to index (`total == 0`).
/// Characters outside the lowercase alphabet behave like a position of -1,
/// i.e. they select index 0.
///
/// # Examples
///
/// ```
/// use portrait_builder::genome::letter_to_index;
///
/// assert_eq!(letter_to_index('0', 7), Some(0));
/// assert_eq!(letter_to_index('a', 7), Some(1));
/// assert_eq!(letter_to_index('g', 7), Some(0)); // wraps
/// assert_eq!(letter_to_index('a', 0), None);
/// ```
pub fn letter_to_index(letter: char, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    if letter == '0' {
        return Some(0);
    }

    let position = ALPHABET
        .iter()
        .position(|&c| c as char == letter)
        .map_or(0, |p| p + 1);
    let index = position % total;
    Some(if index == total { 0 } else { index })
}

/// Convert an index back to its genome letter.
///
/// Index 0 is `'0'` rather than the wrapped-around last letter, matching how
/// the game writes characteristics in character history. Indices past the
/// alphabet have no letter.
pub fn index_to_letter(index: usize) -> Option<char> {
    match index {
        0 => Some('0'),
        i => ALPHABET.get(i - 1).map(|&c| c as char),
    }
}

/// Letter for an index that may be absent (`None` displays as `'0'`).
pub fn letter_or_zero(index: Option<usize>) -> char {
    index.and_then(index_to_letter).unwrap_or('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_always_maps_to_zero() {
        for total in 1..=40 {
            assert_eq!(letter_to_index('0', total), Some(0));
        }
    }

    #[test]
    fn test_empty_total_has_no_index() {
        for letter in ['0', 'a', 'z', '#'] {
            assert_eq!(letter_to_index(letter, 0), None);
        }
    }

    #[test]
    fn test_modular_mapping() {
        assert_eq!(letter_to_index('a', 26), Some(1));
        assert_eq!(letter_to_index('b', 3), Some(2));
        assert_eq!(letter_to_index('c', 3), Some(0));
        assert_eq!(letter_to_index('d', 3), Some(1));
        assert_eq!(letter_to_index('z', 26), Some(0));
        assert_eq!(letter_to_index('z', 27), Some(26));
    }

    #[test]
    fn test_unknown_letter_selects_first() {
        assert_eq!(letter_to_index('A', 5), Some(0));
        assert_eq!(letter_to_index('?', 5), Some(0));
    }

    #[test]
    fn test_round_trip_without_wraparound() {
        for (i, &c) in ALPHABET.iter().enumerate().take(25) {
            let letter = c as char;
            let index = letter_to_index(letter, 26).unwrap();
            assert_eq!(index, i + 1);
            assert_eq!(index_to_letter(index), Some(letter));
        }
    }

    #[test]
    fn test_zero_asymmetry() {
        // 'z' wraps to 0 with 26 tiles, and 0 reads back as '0', not 'z'
        assert_eq!(letter_to_index('z', 26), Some(0));
        assert_eq!(index_to_letter(0), Some('0'));
        assert_eq!(letter_or_zero(None), '0');
    }

    #[test]
    fn test_index_past_alphabet() {
        assert_eq!(index_to_letter(26), Some('z'));
        assert_eq!(index_to_letter(27), None);
    }
}
