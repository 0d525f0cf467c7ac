/// Size statistics of a piece of input text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub paragraphs: usize,
    pub lines: usize,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
            paragraphs: count_paragraphs(text),
            lines: text.lines().filter(|l| !l.trim().is_empty()).count(),
        }
    }
}

// Paragraphs are the non-blank blocks between literal "\n\n" separators.
fn count_paragraphs(text: &str) -> usize {
    text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}
