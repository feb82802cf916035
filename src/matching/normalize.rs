//! Value normalization and string similarity

use rapidfuzz::fuzz;

/// Normalize a raw value for comparison: transliterate to ASCII, case-fold,
/// strip punctuation and whitespace, then replace any remaining
/// non-alphanumeric characters. Returns `None` when nothing is left.
pub fn normalize_value(value: &str) -> Option<String> {
    let folded = deunicode::deunicode(value).to_lowercase();
    let processed: String = folded
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && !c.is_whitespace())
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let processed = processed.trim();
    (!processed.is_empty()).then(|| processed.to_string())
}

/// Best similarity of the shorter string against every equally long window
/// of the longer one, in [0, 1].
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 1.0 } else { 0.0 };
    }

    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let score = fuzz::ratio(short.iter().copied(), window.iter().copied());
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value("  Müller, GmbH. ").as_deref(), Some("mullergmbh"));
        assert_eq!(normalize_value("São Paulo").as_deref(), Some("saopaulo"));
        assert_eq!(normalize_value("ABC-123").as_deref(), Some("abc123"));
        assert_eq!(normalize_value(" .,; "), None);
        assert_eq!(normalize_value(""), None);
    }

    #[test]
    fn test_partial_ratio() {
        assert_eq!(partial_ratio("york", "newyork"), 1.0);
        assert_eq!(partial_ratio("newyork", "york"), 1.0);
        assert!(partial_ratio("berlin", "paris") < 0.75);
        assert_eq!(partial_ratio("", ""), 1.0);
        assert_eq!(partial_ratio("", "a"), 0.0);
    }
}
