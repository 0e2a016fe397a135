use std::fmt::{self, Write};

/// How a backend spells a bound-parameter marker.
///
/// The statement builders never branch on the backend; they render through the
/// style they are handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderStyle {
    /// `?` for every parameter (SQLite).
    Positional,
    /// `$1, $2, ...` numbered from one, never reused (Postgres).
    Numbered,
}

impl PlaceholderStyle {
    /// Append the marker for the zero-based parameter `index`.
    pub fn write_to(self, out: &mut String, index: usize) {
        match self {
            PlaceholderStyle::Positional => out.push('?'),
            PlaceholderStyle::Numbered => {
                let _ = write!(out, "${}", index + 1);
            }
        }
    }

    /// The marker for the zero-based parameter `index`.
    pub fn placeholder(self, index: usize) -> String {
        let mut out = String::new();
        self.write_to(&mut out, index);
        out
    }
}

impl fmt::Display for PlaceholderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderStyle::Positional => f.write_str("positional"),
            PlaceholderStyle::Numbered => f.write_str("numbered"),
        }
    }
}
