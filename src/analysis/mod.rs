// Local analysis — keyword extraction and confidence scoring.
//
// Both are pure functions over the input text; neither calls a provider.

pub mod confidence;
pub mod keywords;

pub use confidence::calculate_confidence;
pub use keywords::KeywordExtractor;
