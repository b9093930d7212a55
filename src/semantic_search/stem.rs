//! Porter2/Snowball stemming via `rust-stemmers`, the standard crate for
//! this rather than a hand-rolled implementation.

use rust_stemmers::{Algorithm, Stemmer};
use std::sync::OnceLock;

fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

pub fn stem(word: &str) -> String {
    stemmer().stem(word).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_common_suffixes() {
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("connections"), "connect");
    }
}
