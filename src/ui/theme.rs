use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub comment: Color, // Grey
    pub success: Color, // Green
    pub error: Color,   // Red
    pub border_focused: Color,
    pub border_normal: Color,
    pub status_bg: Color,

    // Token colors of the highlighter
    pub keyword: Color,
    pub variable: Color,
    pub constant: Color,
    pub string: Color,
    pub fallback: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    status_bg: Color::Rgb(50, 50, 70),
    keyword: Color::Magenta,
    variable: Color::Cyan,
    constant: Color::Green,
    string: Color::Yellow,
    fallback: Color::White,
};
