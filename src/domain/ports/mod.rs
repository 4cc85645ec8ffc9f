pub mod inference;

pub use inference::InferenceProvider;
