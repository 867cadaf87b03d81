pub mod annotator;

pub use annotator::{AnnotateResponse, Annotator, AnnotatorConfig, HttpAnnotatorClient, TaggedToken};
