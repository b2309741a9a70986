/// Sanitize OCR output before amount and GSTIN extraction.
/// Strips control characters, trims every line, drops blank lines.
/// Keeps bill punctuation and currency symbols so amount patterns still match.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ','
                        | ';'
                        | ':'
                        | '-'
                        | '/'
                        | '('
                        | ')'
                        | '['
                        | ']'
                        | '+'
                        | '='
                        | '%'
                        | '#'
                        | '@'
                        | '&'
                        | '\''
                        | '"'
                        | '!'
                        | '?'
                        | '*'
                        | '_'
                        | '|'
                        | '₹'
                        | '$'
                        | '€'
                        | '£'
                )
        })
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters() {
        let raw = "Total: 500\x01\x02\x03\nDate: 2024-01-15";
        let clean = sanitize_extracted_text(raw);
        assert!(!clean.contains('\x01'));
        assert!(clean.contains("Total: 500"));
        assert!(clean.contains("2024-01-15"));
    }

    #[test]
    fn preserves_currency_and_grouping() {
        let raw = "Grand Total: ₹ 1,23,456.00 (incl. GST 18%)";
        let clean = sanitize_extracted_text(raw);
        assert_eq!(clean, raw);
    }

    #[test]
    fn collapses_blank_lines() {
        let raw = "Line one\n\n\n\nLine two\n\n\nLine three";
        let clean = sanitize_extracted_text(raw);
        assert_eq!(clean, "Line one\nLine two\nLine three");
    }

    #[test]
    fn trims_whitespace_per_line() {
        let raw = "  GSTIN: 29ABCDE1234F1Z5  \n  Thank you  ";
        let clean = sanitize_extracted_text(raw);
        assert_eq!(clean, "GSTIN: 29ABCDE1234F1Z5\nThank you");
    }

    #[test]
    fn only_control_chars_returns_empty() {
        assert_eq!(sanitize_extracted_text("\x00\x01\x02"), "");
        assert_eq!(sanitize_extracted_text(""), "");
    }

    #[test]
    fn keeps_table_pipes_from_vision_models() {
        let clean = sanitize_extracted_text("| Item | Qty | Rate |\n| Rice | 2 | 60.00 |");
        assert!(clean.contains("| Rice | 2 | 60.00 |"));
    }
}
