pub mod checksum_writer;
pub mod metadata;
