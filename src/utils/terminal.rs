//! Terminal output sanitization
//!
//! Decoded QR content is attacker-controlled: anyone can print a code containing escape
//! sequences. Everything decoded from an image passes through [`sanitize_for_terminal`]
//! before it is written to stdout or drawn in the browser. Stored history keeps the
//! original bytes.

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Strips ANSI escape sequences and control characters from a string
///
/// Removes CSI sequences (`ESC [ ... final`), OSC sequences (`ESC ] ... BEL` or
/// `ESC ] ... ESC \`, used for titles and hyperlinks) and two-character escapes. Other
/// control characters are dropped, except tab, newline and carriage return.
///
/// # Examples
///
/// ```
/// use qr_toolkit::utils::terminal::sanitize_for_terminal;
///
/// let text = "\x1b[31mRed text\x1b[0m";
/// assert_eq!(sanitize_for_terminal(text), "Red text");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ESC {
            match chars.next() {
                Some('[') => {
                    // CSI: parameters then one final byte in @..~
                    for next_ch in chars.by_ref() {
                        if ('@'..='~').contains(&next_ch) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    // OSC: terminated by BEL or ST (ESC \)
                    while let Some(next_ch) = chars.next() {
                        if next_ch == BEL {
                            break;
                        }
                        if next_ch == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                // Two-character escape, or a trailing lone ESC
                _ => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Single-line form for list rows: sanitized, with line breaks and tabs shown as spaces
pub fn single_line(text: &str) -> String {
    sanitize_for_terminal(text)
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
        .collect()
}
