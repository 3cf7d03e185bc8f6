//! Log file formats
//!
//! Detects the field delimiter of a delimited text log.

use std::path::Path;

/// Field delimiters accepted in log files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// Tab-separated values
    Tab,
    /// `|`
    Pipe,
}

impl Delimiter {
    /// Candidates in tie-break order
    const CANDIDATES: [Delimiter; 4] = [
        Delimiter::Comma,
        Delimiter::Semicolon,
        Delimiter::Tab,
        Delimiter::Pipe,
    ];

    /// Delimiter implied by the file extension, if any
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "tsv" | "tab" => Some(Delimiter::Tab),
            _ => None,
        }
    }

    /// Guess the delimiter from the header line
    ///
    /// Picks the candidate occurring most often outside double quotes.
    /// Falls back to comma when the line holds a single column.
    pub fn sniff(header: &str) -> Self {
        let mut counts = [0usize; 4];
        let mut in_quotes = false;

        for c in header.chars() {
            if c == '"' {
                in_quotes = !in_quotes;
                continue;
            }
            if in_quotes {
                continue;
            }
            if let Some(i) = Self::CANDIDATES.iter().position(|d| d.as_char() == c) {
                counts[i] += 1;
            }
        }

        let mut best = Delimiter::Comma;
        let mut best_count = 0;
        for (delimiter, &count) in Self::CANDIDATES.iter().zip(counts.iter()) {
            if count > best_count {
                best = *delimiter;
                best_count = count;
            }
        }
        best
    }

    /// The delimiter character
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// The delimiter as the byte the CSV reader expects
    pub fn as_byte(&self) -> u8 {
        self.as_char() as u8
    }
}
