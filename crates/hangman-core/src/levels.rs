//! Fixed level table and game constants

use serde::Serialize;

/// Highest level; finishing it ends the game
pub const MAX_LEVEL: u8 = 5;
/// Words that must be solved to clear a level
pub const WORDS_PER_LEVEL: u8 = 3;
/// Wrong guesses allowed before the word is lost
pub const MAX_WRONG_ATTEMPTS: u8 = 6;
/// Seconds on the clock for every word round
pub const LEVEL_TIME_LIMIT_SECS: u32 = 120;
/// Points per solved word, multiplied by the level number
pub const POINTS_PER_LEVEL: u32 = 100;
/// Letters offered on the keyboard, in display order
pub const ALPHABET: [char; 27] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'Ñ', 'O', 'P', 'Q',
    'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];
/// Shown in place of letters not yet guessed
pub const MASK_PLACEHOLDER: char = '_';

/// One stage of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelDefinition {
    /// Level number, 1-based
    pub number: u8,
    /// Candidate words, uppercase
    pub words: &'static [&'static str],
    /// Background asset key for front-ends
    pub background: &'static str,
}

impl LevelDefinition {
    /// Points awarded for each word solved on this level
    pub fn points_per_word(&self) -> u32 {
        POINTS_PER_LEVEL * self.number as u32
    }

    /// Whether this is the last level
    pub fn is_final(&self) -> bool {
        self.number == MAX_LEVEL
    }
}

pub const LEVELS: [LevelDefinition; MAX_LEVEL as usize] = [
    LevelDefinition {
        number: 1,
        words: &["SOL", "LUZ", "MAR"],
        background: "level1",
    },
    LevelDefinition {
        number: 2,
        words: &["CASA", "MESA", "SOPA"],
        background: "level2",
    },
    LevelDefinition {
        number: 3,
        words: &["PLATO", "LIBRO", "PAPEL"],
        background: "level3",
    },
    LevelDefinition {
        number: 4,
        words: &["VENTANA", "BOTELLA", "PESCADO"],
        background: "level4",
    },
    LevelDefinition {
        number: 5,
        words: &["CALENDARIO", "BIBLIOTECA", "COMPUTADORA"],
        background: "level5",
    },
];

/// Look up a level, clamping out-of-range numbers into 1..=MAX_LEVEL
pub fn level(number: u8) -> &'static LevelDefinition {
    let idx = number.clamp(1, MAX_LEVEL) as usize - 1;
    &LEVELS[idx]
}

/// Normalize a key press into an alphabet letter.
///
/// Lowercase input (including `ñ`) is upper-cased; anything outside the
/// 27-letter alphabet yields `None`.
pub fn normalize_letter(c: char) -> Option<char> {
    let upper = match c {
        'ñ' => 'Ñ',
        c => c.to_ascii_uppercase(),
    };
    ALPHABET.contains(&upper).then_some(upper)
}

/// Format seconds as `m:ss`
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_table_is_well_formed() {
        for (i, def) in LEVELS.iter().enumerate() {
            assert_eq!(def.number as usize, i + 1);
            assert!(!def.words.is_empty());
            for word in def.words {
                assert!(word.chars().all(|c| ALPHABET.contains(&c)), "{word}");
            }
        }
    }

    #[test]
    fn test_points_scale_with_level() {
        assert_eq!(level(1).points_per_word(), 100);
        assert_eq!(level(5).points_per_word(), 500);
        assert!(level(5).is_final());
        assert!(!level(4).is_final());
    }

    #[test]
    fn test_level_lookup_clamps() {
        assert_eq!(level(0).number, 1);
        assert_eq!(level(9).number, MAX_LEVEL);
    }

    #[test]
    fn test_normalize_letter() {
        assert_eq!(normalize_letter('a'), Some('A'));
        assert_eq!(normalize_letter('Z'), Some('Z'));
        assert_eq!(normalize_letter('ñ'), Some('Ñ'));
        assert_eq!(normalize_letter('Ñ'), Some('Ñ'));
        assert_eq!(normalize_letter('1'), None);
        assert_eq!(normalize_letter('é'), None);
        assert_eq!(normalize_letter(' '), None);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(120), "2:00");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(9), "0:09");
        assert_eq!(format_time(0), "0:00");
    }
}
