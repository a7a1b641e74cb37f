// Cell values as read from a tabular source, and their coercion to fields.
//
// Every business rule reads cells through `text()` / `flag()`, so an empty
// string, a whitespace-only string, an Empty cell and a missing index all
// mean "field absent".

/// A single cell from a CSV record or a worksheet row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

const FALSE_WORDS: [&str; 5] = ["0", "false", "no", "n", "f"];

impl Cell {
    /// Trimmed text, or None when the cell holds nothing.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() { None } else { Some(s.to_string()) }
            }
            Cell::Int(n) => Some(n.to_string()),
            Cell::Float(n) => {
                // integers without decimals
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{n}"))
                }
            }
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    /// Truthiness for yes/no columns.
    pub fn flag(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Bool(b) => *b,
            Cell::Int(n) => *n != 0,
            Cell::Float(n) => *n != 0.0,
            Cell::Text(s) => {
                let s = s.trim().to_lowercase();
                !s.is_empty() && !FALSE_WORDS.contains(&s.as_str())
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() { Cell::Empty } else { Cell::Text(s.to_string()) }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() { Cell::Empty } else { Cell::Text(s) }
    }
}

/// Cell at `index`, treating a short row as Empty.
pub fn cell_at(row: &[Cell], index: usize) -> &Cell {
    row.get(index).unwrap_or(&Cell::Empty)
}

/// Convenience for building rows: `row(&["Jane", "", "extremist"])`.
pub fn row(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::from(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(Cell::Empty.text(), None);
        assert_eq!(Cell::Text("   ".into()).text(), None);
        assert_eq!(Cell::Text(" x ".into()).text().as_deref(), Some("x"));
        assert_eq!(cell_at(&[], 3).text(), None);
    }

    #[test]
    fn numbers_render_without_spurious_decimals() {
        assert_eq!(Cell::Float(42.0).text().as_deref(), Some("42"));
        assert_eq!(Cell::Float(1.5).text().as_deref(), Some("1.5"));
        assert_eq!(Cell::Int(-3).text().as_deref(), Some("-3"));
    }

    #[test]
    fn flags() {
        assert!(Cell::Text("x".into()).flag());
        assert!(Cell::Text("Yes".into()).flag());
        assert!(!Cell::Text("No".into()).flag());
        assert!(!Cell::Text("FALSE".into()).flag());
        assert!(!Cell::Text("0".into()).flag());
        assert!(Cell::Int(1).flag());
        assert!(!Cell::Float(0.0).flag());
        assert!(Cell::Bool(true).flag());
        assert!(!Cell::Empty.flag());
    }
}
