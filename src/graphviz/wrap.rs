//! Greedy word wrapping

/// Wraps `text` into lines of at most `width` bytes where possible.
///
/// Lines break after a space, and the space stays at the end of the line,
/// so concatenating the result reproduces `text` exactly. A word longer
/// than `width` is never split; the line runs on to the next space instead.
///
/// ```
/// use task_graph::graphviz::word_wrap;
///
/// assert_eq!(
///     word_wrap("this is a simple line of text", 16),
///     vec!["this is a simple ", "line of text"],
/// );
/// ```
pub fn word_wrap(text: &str, width: usize) -> Vec<&str> {
    if width == 0 && text.is_empty() {
        return Vec::new();
    }

    if text.len() <= width {
        return vec![text];
    }

    let mut result = Vec::with_capacity(text.len() / width.max(1) + 1);
    let mut start = 0;

    while start < text.len() {
        let finish = find_break_point(text.as_bytes(), start, width);
        result.push(&text[start..=finish]);
        start = finish + 1;
    }

    result
}

/// Index of the last byte belonging on the line that begins at `start`.
///
/// Always either a space or the final byte, so slicing just past it stays on
/// a character boundary.
fn find_break_point(text: &[u8], start: usize, width: usize) -> usize {
    let limit = start + width + 1;
    if limit >= text.len() {
        return text.len() - 1;
    }

    if let Some(index) = text[start..limit].iter().rposition(|&b| b == b' ') {
        return start + index;
    }

    // Continuous text; run on to the end of the word
    match text[limit..].iter().position(|&b| b == b' ') {
        Some(index) => limit + index,
        None => text.len() - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wraps_at_spaces() {
        let cases: &[(&str, usize, &[&str])] = &[
            (
                "this is a simple line of text",
                15,
                &["this is a ", "simple line of ", "text"],
            ),
            (
                "this is a simple line of text",
                16,
                &["this is a simple ", "line of text"],
            ),
            (
                "this is a simple line of text",
                20,
                &["this is a simple ", "line of text"],
            ),
            (
                "this is a simple line of text",
                21,
                &["this is a simple line ", "of text"],
            ),
            ("", 0, &[]),
            (
                "this is a sample text",
                0,
                &["this ", "is ", "a ", "sample ", "text"],
            ),
        ];

        for (text, width, expected) in cases {
            assert_eq!(&word_wrap(text, *width), expected, "text={text:?} width={width}");
        }
    }

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(word_wrap("short text", 40), vec!["short text"]);
        assert_eq!(word_wrap("", 10), vec![""]);
    }

    #[test]
    fn long_word_is_not_split() {
        let word = "x".repeat(100);
        assert_eq!(word_wrap(&word, 40), vec![word.as_str()]);
    }

    #[test]
    fn long_word_runs_to_next_space() {
        assert_eq!(
            word_wrap("abcdefghij klm", 4),
            vec!["abcdefghij ", "klm"]
        );
    }

    #[test]
    fn multibyte_text_splits_on_boundaries() {
        let text = "héllo wörld ünïcode";
        let lines = word_wrap(text, 6);
        assert_eq!(lines.concat(), text);
    }

    proptest! {
        #[test]
        fn concatenation_reproduces_text(text in "[a-z ]{0,80}", width in 0usize..50) {
            let lines = word_wrap(&text, width);
            prop_assert_eq!(lines.concat(), text);
        }

        #[test]
        fn only_last_line_may_end_without_space(text in "[a-z ]{1,80}", width in 0usize..50) {
            let lines = word_wrap(&text, width);
            for line in &lines[..lines.len() - 1] {
                prop_assert!(line.ends_with(' '));
            }
        }

        #[test]
        fn words_within_width_stay_whole(words in prop::collection::vec("[a-z]{1,8}", 1..12), width in 8usize..30) {
            let text = words.join(" ");
            let lines = word_wrap(&text, width);
            let rejoined: Vec<String> = lines
                .iter()
                .flat_map(|l| l.split(' '))
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect();
            prop_assert_eq!(rejoined, words);
        }
    }
}
