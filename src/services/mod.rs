pub mod aggregator;
pub mod llm_service;
pub mod pdf_service;
pub mod snippet_extractor;
pub mod snippet_writer;
pub mod text_preprocessor;
pub mod word_counter;

pub use llm_service::{LlmService, TextGenerator};
pub use pdf_service::{split_pdf, PdfDocument};
pub use snippet_extractor::{extract_code_snippet, ExtractionRequest};
pub use snippet_writer::write_code_snippet_to_file;
pub use text_preprocessor::preprocess_text;
pub use word_counter::{count_word, count_word_in_text};
