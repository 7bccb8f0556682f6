//! Article sentiment classification.

pub mod fallback;
pub mod gemini;
pub mod source;

pub use fallback::{keyword_sentiment, FALLBACK_CONFIDENCE, NEGATIVE_WORDS, POSITIVE_WORDS};
pub use gemini::{build_prompt, parse_analysis, strip_code_fences, GeminiClassifier};
pub use source::SentimentSource;
