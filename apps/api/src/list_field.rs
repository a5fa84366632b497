//! List-valued record fields.
//!
//! Lists are stored as JSON arrays. Delimited text only appears at the edges:
//! form text areas ("Swift, UIKit" or one resource per line) and rows written
//! before lists were structured.

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Required skills on a job application.
    Comma,
    /// Learning resources, one per line.
    Newline,
}

impl Separator {
    pub fn as_char(self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Newline => '\n',
        }
    }
}

/// Joins the non-empty trimmed elements with the bare separator.
#[allow(dead_code)]
pub fn encode(items: &[String], sep: Separator) -> String {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(&sep.as_char().to_string())
}

/// Splits on the separator, trims each piece and drops empty pieces.
pub fn decode(text: &str, sep: Separator) -> Vec<String> {
    text.split(sep.as_char())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Trims every element and drops the empty ones, keeping order.
pub fn normalize<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Appends `item` unless it is blank. Returns whether the list changed.
pub fn add_item(items: &mut Vec<String>, item: &str) -> bool {
    let item = item.trim();
    if item.is_empty() {
        return false;
    }
    items.push(item.to_string());
    true
}

/// Removes every element equal to `item` (after trimming). Returns the number removed.
pub fn remove_item(items: &mut Vec<String>, item: &str) -> usize {
    let item = item.trim();
    let before = items.len();
    items.retain(|s| s != item);
    before - items.len()
}

/// Reads a stored list column: a JSON array, or legacy delimited text.
pub fn decode_stored(raw: Option<&str>, sep: Separator) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<String>>(trimmed) {
            Ok(items) => return normalize(items),
            Err(e) => warn!("List column is not a valid JSON array ({e}); decoding as delimited text"),
        }
    }
    decode(trimmed, sep)
}

/// Serializes a list for storage.
pub fn encode_stored(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// A list as supplied by a form: either a JSON array or delimited text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<String>),
    Text(String),
}

impl Default for ListInput {
    fn default() -> Self {
        ListInput::Items(Vec::new())
    }
}

impl ListInput {
    pub fn into_items(self, sep: Separator) -> Vec<String> {
        match self {
            ListInput::Items(items) => normalize(items),
            ListInput::Text(text) => decode(&text, sep),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_encode_preserves_order() {
        let skills = strings(&["Swift", "UIKit", "CoreData", "Swift"]);
        assert_eq!(decode(&encode(&skills, Separator::Comma), Separator::Comma), skills);

        let resources = strings(&["https://a.example/x,y", "Book: Rust in Action"]);
        assert_eq!(
            decode(&encode(&resources, Separator::Newline), Separator::Newline),
            resources
        );
    }

    #[test]
    fn test_decode_trims_and_drops_empty_pieces() {
        assert_eq!(
            decode(" Swift ,, UIKit,  ,", Separator::Comma),
            strings(&["Swift", "UIKit"])
        );
        assert!(decode("", Separator::Newline).is_empty());
    }

    #[test]
    fn test_encode_skips_blank_elements() {
        let items = strings(&["  a ", "", "   ", "b"]);
        assert_eq!(encode(&items, Separator::Comma), "a,b");
    }

    #[test]
    fn test_add_item_ignores_blank() {
        let mut items = strings(&["a"]);
        assert!(!add_item(&mut items, "   "));
        assert!(add_item(&mut items, " b "));
        assert_eq!(items, strings(&["a", "b"]));
    }

    #[test]
    fn test_remove_item_removes_all_matches() {
        let mut items = strings(&["a", "b", "a"]);
        assert_eq!(remove_item(&mut items, "a"), 2);
        assert_eq!(items, strings(&["b"]));
        assert_eq!(remove_item(&mut items, "zzz"), 0);
    }

    #[test]
    fn test_decode_stored_reads_json_and_legacy_text() {
        assert_eq!(
            decode_stored(Some(r#"["Rust, the book","tokio"]"#), Separator::Comma),
            strings(&["Rust, the book", "tokio"])
        );
        assert_eq!(
            decode_stored(Some("Swift,UIKit,CoreData"), Separator::Comma),
            strings(&["Swift", "UIKit", "CoreData"])
        );
        assert!(decode_stored(None, Separator::Newline).is_empty());
    }

    #[test]
    fn test_encode_stored_keeps_separator_inside_elements() {
        let items = strings(&["a,b", "c"]);
        let stored = encode_stored(&items);
        assert_eq!(decode_stored(Some(&stored), Separator::Comma), items);
    }

    #[test]
    fn test_list_input_accepts_array_or_text() {
        let from_array: ListInput = serde_json::from_str(r#"[" Swift ", ""]"#).unwrap();
        assert_eq!(from_array.into_items(Separator::Comma), strings(&["Swift"]));

        let from_text: ListInput = serde_json::from_str(r#""Swift, UIKit""#).unwrap();
        assert_eq!(
            from_text.into_items(Separator::Comma),
            strings(&["Swift", "UIKit"])
        );
    }
}
