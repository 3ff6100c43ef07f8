//! Text analyzers registered on every product index.

use tantivy::tokenizer::{
    LowerCaser, SimpleTokenizer, TextAnalyzer, Token, TokenStream, Tokenizer,
};
use tantivy::Index;

/// Analyzer name used by the shingle sub-fields
pub const SHINGLE_ANALYZER: &str = "shingles";

/// Emits runs of `min..=max` consecutive words joined by a space.
///
/// Single words are never emitted, so a shingle field only matches when the
/// query carries an adjacent word pair (or triple) from the document.
#[derive(Clone)]
pub struct ShingleTokenizer {
    min_size: usize,
    max_size: usize,
    words: SimpleTokenizer,
}

impl ShingleTokenizer {
    pub fn new(min_size: usize, max_size: usize) -> Self {
        let min_size = min_size.max(2);
        Self {
            min_size,
            max_size: max_size.max(min_size),
            words: SimpleTokenizer::default(),
        }
    }
}

impl Default for ShingleTokenizer {
    fn default() -> Self {
        Self::new(2, 3)
    }
}

pub struct ShingleTokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Tokenizer for ShingleTokenizer {
    type TokenStream<'a> = ShingleTokenStream;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> ShingleTokenStream {
        let mut words = Vec::new();
        let mut stream = self.words.token_stream(text);
        while stream.advance() {
            let token = stream.token();
            words.push((token.offset_from, token.offset_to, token.text.clone()));
        }

        let mut tokens = Vec::new();
        for start in 0..words.len() {
            for size in self.min_size..=self.max_size {
                let end = start + size;
                if end > words.len() {
                    break;
                }
                let window = &words[start..end];
                tokens.push(Token {
                    offset_from: window[0].0,
                    offset_to: window[size - 1].1,
                    position: start,
                    text: window
                        .iter()
                        .map(|(_, _, text)| text.as_str())
                        .collect::<Vec<_>>()
                        .join(" "),
                    position_length: size,
                });
            }
        }

        ShingleTokenStream { tokens, cursor: 0 }
    }
}

impl TokenStream for ShingleTokenStream {
    fn advance(&mut self) -> bool {
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn token(&self) -> &Token {
        &self.tokens[self.cursor - 1]
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.tokens[self.cursor - 1]
    }
}

pub fn shingle_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(ShingleTokenizer::default())
        .filter(LowerCaser)
        .build()
}

/// Register custom analyzers. Tokenizers are not persisted with an index, so
/// this runs on both create and open.
pub fn register_analyzers(index: &Index) {
    index
        .tokenizers()
        .register(SHINGLE_ANALYZER, shingle_analyzer());
}

/// Analyze `text` with `analyzer` and return the token texts.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut stream = analyzer.token_stream(text);
    while stream.advance() {
        tokens.push(stream.token().text.clone());
    }
    tokens
}
