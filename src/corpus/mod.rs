pub mod classifier;

pub use classifier::{classify, file_extension, is_corpus_file, Classification, ENCRYPTION_SUFFIXES};
