//! Text layout for PDF generation
//!
//! Greedy word wrap against a section's pixel width using an average glyph
//! width for the builtin Helvetica face. Good enough for captions and short
//! paragraphs without shipping font metrics.

/// Average advance width of a Helvetica glyph as a fraction of the font size.
const AVG_GLYPH_WIDTH_EM: f32 = 0.5;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

fn font_px(font_size_pt: f32) -> f32 {
    font_size_pt * 96.0 / 72.0
}

/// Estimated rendered width of a line, in working pixels.
pub fn line_width_px(line: &str, font_size_pt: f32) -> f32 {
    line.chars().count() as f32 * font_px(font_size_pt) * AVG_GLYPH_WIDTH_EM
}

/// Line advance in working pixels.
pub fn line_height_px(font_size_pt: f32) -> f32 {
    font_px(font_size_pt) * LINE_HEIGHT_FACTOR
}

/// Wrap `text` to fit `max_width_px`, breaking at whitespace.
///
/// A single word wider than the box gets its own line and overflows; explicit
/// newlines in the input always start a new line.
pub fn wrap_text(text: &str, max_width_px: f32, font_size_pt: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if current.is_empty() || line_width_px(&candidate, font_size_pt) <= max_width_px {
                current = candidate;
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text("hello world", 1000.0, 16.0);
        assert_eq!(lines, vec!["hello world".to_string()]);
    }

    #[test]
    fn long_text_wraps_at_word_boundaries() {
        let lines = wrap_text("alpha beta gamma delta", 90.0, 16.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(!line.contains("alpha beta gamma"));
        }
        assert_eq!(lines.join(" "), "alpha beta gamma delta");
    }

    #[test]
    fn single_oversized_word_gets_its_own_line() {
        let lines = wrap_text("a incomprehensibilities b", 60.0, 16.0);
        assert!(lines.contains(&"incomprehensibilities".to_string()));
    }

    #[test]
    fn explicit_newlines_are_respected() {
        let lines = wrap_text("first\nsecond", 1000.0, 16.0);
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        assert_eq!(wrap_text("", 100.0, 16.0), vec![String::new()]);
    }

    #[test]
    fn wider_font_measures_wider_lines() {
        assert!(line_width_px("abc", 32.0) > line_width_px("abc", 16.0));
    }
}
