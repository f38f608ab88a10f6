//! Token-based syntax highlighting
//!
//! Styles are looked up by token-type name (the names [`TokenKind::name`]
//! returns), so the mapping is fixed and independent of the parser tables.
//! Kinds without an entry fall back to plain white.

use crate::parser::{Lexer, Token, TokenKind};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Display style for a token-type name
pub fn style_for(kind_name: &str) -> Style {
    match kind_name {
        "function" | "return" | "if" | "else" | "while" | "foreach" | "in" | "->" | ":" => {
            Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD)
        }
        "fn_name" | "cust_fn_name" => Style::default().fg(DEFAULT_THEME.variable),
        "true" | "false" | "int" => Style::default().fg(DEFAULT_THEME.constant),
        "string" => Style::default().fg(DEFAULT_THEME.string),
        _ => Style::default().fg(DEFAULT_THEME.fallback),
    }
}

pub fn token_style(token: &Token) -> Style {
    style_for(token.kind.name())
}

/// Render source text into styled lines.
///
/// Whitespace and comments between tokens keep the default style.  If the
/// lexer rejects part of the input, everything from that point on is shown
/// unstyled.
pub fn highlight_source(source: &str) -> Vec<Line<'static>> {
    let mut segments: Vec<(&str, Style)> = Vec::new();
    let mut cursor = 0;

    let mut lexer = Lexer::new(source);
    while let Ok(token) = lexer.next_token() {
        if token.kind == TokenKind::Eof {
            break;
        }
        let (start, end) = (token.pos.offset, token.end());
        if start > cursor {
            segments.push((&source[cursor..start], Style::default()));
        }
        segments.push((&source[start..end], token_style(&token)));
        cursor = end;
    }
    if cursor < source.len() {
        segments.push((&source[cursor..], Style::default()));
    }

    split_lines(segments)
}

// Break styled segments at newlines; a segment may span several lines.
fn split_lines(segments: Vec<(&str, Style)>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for (text, style) in segments {
        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            push_piece(&mut current, first, style);
        }
        for piece in pieces {
            lines.push(Line::from(std::mem::take(&mut current)));
            push_piece(&mut current, piece, style);
        }
    }
    lines.push(Line::from(current));
    lines
}

fn push_piece(spans: &mut Vec<Span<'static>>, text: &str, style: Style) {
    let text = text.trim_end_matches('\r');
    if !text.is_empty() {
        spans.push(Span::styled(text.to_string(), style));
    }
}
