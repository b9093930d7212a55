//! Name splitting (spec.md §4.5): separators, camelCase transitions,
//! PascalCase acronym terminations, and letter↔digit boundaries. Output
//! words are lowercased and never empty (spec.md §8 invariant 9).

const SEPARATORS: &[char] = &['_', '-', '.', '/'];

/// Splits `name` into lowercased words.
pub fn split(name: &str) -> Vec<String> {
    name.split(SEPARATORS)
        .filter(|chunk| !chunk.is_empty())
        .flat_map(split_compound)
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Splits one separator-free chunk on case/digit boundaries.
fn split_compound(chunk: &str) -> Vec<String> {
    let chars: Vec<char> = chunk.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut boundaries = vec![0usize];
    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let cur = chars[i];

        let camel_boundary = prev.is_lowercase() && cur.is_uppercase();
        let acronym_boundary = prev.is_uppercase()
            && cur.is_uppercase()
            && chars.get(i + 1).is_some_and(|next| next.is_lowercase());
        let digit_boundary = prev.is_alphanumeric()
            && cur.is_alphanumeric()
            && prev.is_alphabetic() != cur.is_alphabetic();

        if camel_boundary || acronym_boundary || digit_boundary {
            boundaries.push(i);
        }
    }
    boundaries.push(chars.len());
    boundaries.dedup();

    boundaries
        .windows(2)
        .map(|pair| chars[pair[0]..pair[1]].iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_explicit_separators() {
        assert_eq!(split("foo_bar-baz.qux/quux"), vec!["foo", "bar", "baz", "qux", "quux"]);
    }

    #[test]
    fn splits_camel_case() {
        assert_eq!(split("getUserName"), vec!["get", "user", "name"]);
    }

    #[test]
    fn splits_pascal_acronym_terminations() {
        assert_eq!(split("HTTPServer"), vec!["http", "server"]);
        assert_eq!(split("parseXMLDocument"), vec!["parse", "xml", "document"]);
    }

    #[test]
    fn splits_letter_digit_boundaries() {
        assert_eq!(split("user2Name"), vec!["user", "2", "name"]);
        assert_eq!(split("base64Encode"), vec!["base", "64", "encode"]);
    }

    #[test]
    fn never_produces_empty_tokens() {
        for name in ["", "___", "a", "A", "a1B2c3"] {
            assert!(split(name).iter().all(|w| !w.is_empty()));
        }
    }
}
