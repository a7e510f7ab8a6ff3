#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_off(self) -> bool {
        self == OFF
    }
}

pub const OFF: Color = Color::rgb(0, 0, 0);
pub const RED: Color = Color::rgb(255, 0, 0);
pub const GREEN: Color = Color::rgb(0, 255, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);
pub const TARGET_YELLOW: Color = Color::rgb(251, 255, 0);
pub const HIT_YELLOW: Color = Color::rgb(255, 255, 0);
pub const PURPLE: Color = Color::rgb(144, 0, 255);

// Rhythm palettes and judgment colors.
pub const PINK: Color = Color::rgb(255, 0, 162);
pub const CYAN: Color = Color::rgb(0, 255, 255);
pub const ORANGE: Color = Color::rgb(255, 30, 0);
pub const SKY: Color = Color::rgb(40, 160, 255);
pub const GOLD: Color = Color::rgb(255, 255, 0);
pub const GREAT_GREEN: Color = Color::rgb(40, 220, 40);
pub const GOOD_VIOLET: Color = Color::rgb(40, 80, 40);
