//! Dot/dash rendering of element sequences

use morse_codecs::element::{Element, ElementKind};

/// Render elements as `.-` notation
///
/// Gaps longer than twice `dot` separate characters with a space; gaps
/// longer than five dots separate words with ` / `.
pub fn to_notation(elements: &[Element], dot: f64) -> String {
    let mut out = String::new();
    for element in elements {
        match element.kind {
            ElementKind::Dot => out.push('.'),
            ElementKind::Dash => out.push('-'),
            ElementKind::Gap if element.duration > 5.0 * dot => out.push_str(" / "),
            ElementKind::Gap if element.duration > 2.0 * dot => out.push(' '),
            ElementKind::Gap => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use morse_codecs::timing::{encode, TimingParams};

    #[test]
    fn test_words_and_characters() {
        let params = TimingParams::with_wpm(20);
        let elements = encode("SOS HI", &params);
        assert_eq!(to_notation(&elements, params.dot_duration()), "... --- ... / .... ..");
    }

    #[test]
    fn test_prosign_has_no_character_gaps() {
        let params = TimingParams::with_wpm(20);
        let elements = encode("[SOS]", &params);
        assert_eq!(to_notation(&elements, params.dot_duration()), "...---...");
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_notation(&[], 0.06), "");
    }
}
