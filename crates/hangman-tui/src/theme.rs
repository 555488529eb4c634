use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Gallows and table borders
    pub border: Color,
    /// Hanged figure
    pub figure: Color,
    /// Revealed letters of the word
    pub letter: Color,
    /// Keyboard cursor background
    pub selected_bg: Color,
    /// Keys already played
    pub used_key: Color,
    /// Misses, losses
    pub error: Color,
    /// Hits, wins
    pub success: Color,
    /// Timer/info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "Oscuro",
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 130, g: 140, b: 170 },
            figure: Color::Rgb { r: 255, g: 255, b: 255 },
            letter: Color::Rgb { r: 80, g: 180, b: 255 },
            selected_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            used_key: Color::Rgb { r: 70, g: 75, b: 90 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Claro",
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            border: Color::Rgb { r: 60, g: 60, b: 80 },
            figure: Color::Rgb { r: 0, g: 0, b: 0 },
            letter: Color::Rgb { r: 30, g: 100, b: 200 },
            selected_bg: Color::Rgb { r: 180, g: 200, b: 255 },
            used_key: Color::Rgb { r: 190, g: 190, b: 205 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            name: "Alto contraste",
            bg: Color::Black,
            fg: Color::White,
            border: Color::White,
            figure: Color::Yellow,
            letter: Color::Cyan,
            selected_bg: Color::Blue,
            used_key: Color::DarkGrey,
            error: Color::Red,
            success: Color::Green,
            info: Color::Grey,
            key: Color::Yellow,
        }
    }

    /// The theme after this one, wrapping around
    pub fn next(&self) -> Self {
        if *self == Self::dark() {
            Self::light()
        } else if *self == Self::light() {
            Self::high_contrast()
        } else {
            Self::dark()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_visits_every_theme() {
        let start = Theme::default();
        let second = start.next();
        let third = second.next();
        assert_eq!(second, Theme::light());
        assert_eq!(third, Theme::high_contrast());
        assert_eq!(third.next(), start);
    }
}
