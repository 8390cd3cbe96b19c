//! Re-clustering pipeline around the engine: sentence tables, encoders and
//! the `recluster` entry point used by the binary.

mod encoder;
mod recluster;
mod records;

pub use encoder::{HashingEncoder, PrecomputedEncoder, SentenceEncoder};
pub use recluster::{recluster, ReclusterOptions, ReclusterReport};
pub use records::{
    read_clustered, read_sentences, write_clustered, ClusteredSentence, SentenceRecord,
    CLUSTERED_COLUMNS,
};
