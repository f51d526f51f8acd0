pub mod client;

pub use client::S3Client;
