// ============================================================
// Layer 4 — Line Preprocessor
// ============================================================
// Cleans one corpus line before it is split into tokens.
//
// The corpus is already tokenised by spaces, so the only job
// here is to make sure "space" means exactly one ASCII space:
//   1. Unicode whitespace variants → ' '
//      (tab, NBSP U+00A0, zero-width U+200B, BOM U+FEFF,
//       ideographic space U+3000)
//   2. Remaining control characters → ' '
//   3. Runs of spaces collapse to one, edges are trimmed
//
// A Japanese line like "私 は\u{3000}学生 です 。" would
// otherwise yield the bogus token "は\u{3000}学生".
//
// Reference: Rust Book §8 (Strings in Rust)

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a single line. Newlines are treated like any other
    /// control character, so the result is always one line.
    pub fn clean(&self, line: &str) -> String {
        let mut out        = String::with_capacity(line.len());
        let mut last_space = true; // swallows leading spaces

        for c in line.chars() {
            let c = match c {
                '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' | '\u{3000}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            };

            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        // At most one trailing space can survive the loop
        if out.ends_with(' ') {
            out.pop();
        }
        out
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
