use core::cmp::Ordering;

/// Locale-style string comparison.
///
/// Case-insensitive char-wise order, then code point order as a tie-break so
/// the result is total. Precomposed Hangul syllables are laid out in
/// dictionary order, so Korean part names sort as a Korean reader expects.
pub fn collate(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Precomputed sort key ordering exactly like [`collate`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollationKey {
    folded: Vec<char>,
    raw: String,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        Self {
            folded: text.chars().flat_map(char::to_lowercase).collect(),
            raw: text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_is_a_tie_break_only() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Post", "post"), Ordering::Less);
        assert_eq!(collate("post", "post"), Ordering::Equal);
    }

    #[test]
    fn keys_agree_with_collate() {
        for (a, b) in [("Shelf", "shelf"), ("Post(H900)", "post(h1200)"), ("기둥", "Post"), ("", "a")] {
            assert_eq!(CollationKey::new(a).cmp(&CollationKey::new(b)), collate(a, b));
        }
    }

    #[test]
    fn hangul_follows_dictionary_order() {
        assert_eq!(collate("기둥", "선반"), Ordering::Less);
        assert_eq!(collate("파렛트랙", "경량랙"), Ordering::Greater);
    }
}
