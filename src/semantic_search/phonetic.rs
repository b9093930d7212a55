//! Four-character Soundex-class phonetic code, hand-rolled rather than a
//! dependency — matching the teacher's preference for small text heuristics
//! over a crate (e.g. its own camelCase/name-splitting code).

fn soundex_digit(c: char) -> Option<u8> {
    match c.to_ascii_lowercase() {
        'b' | 'f' | 'p' | 'v' => Some(1),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some(2),
        'd' | 't' => Some(3),
        'l' => Some(4),
        'm' | 'n' => Some(5),
        'r' => Some(6),
        _ => None,
    }
}

/// Classic four-character Soundex code: first letter, then up to three
/// digits for subsequent consonant groups, collapsing adjacent duplicates
/// and skipping vowels/`h`/`w`/`y`; padded with `0`.
pub fn phonetic_code(word: &str) -> String {
    let mut chars = word.chars().filter(|c| c.is_alphabetic());
    let Some(first) = chars.next() else {
        return "0000".to_string();
    };

    let mut code = String::new();
    code.push(first.to_ascii_uppercase());

    let mut last_digit = soundex_digit(first);
    for c in chars {
        let digit = soundex_digit(c);
        if digit.is_some() && digit != last_digit {
            code.push((b'0' + digit.unwrap()) as char);
        }
        if !matches!(c.to_ascii_lowercase(), 'h' | 'w') {
            last_digit = digit;
        }
        if code.len() == 4 {
            break;
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_examples() {
        assert_eq!(phonetic_code("Robert"), "R163");
        assert_eq!(phonetic_code("Rupert"), "R163");
        assert_eq!(phonetic_code("Ashcraft"), "A261");
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(phonetic_code(""), "0000");
    }

    #[test]
    fn always_four_characters() {
        for word in ["a", "to", "three", "verylongword"] {
            assert_eq!(phonetic_code(word).len(), 4);
        }
    }
}
