pub mod feed_client;
pub mod object_store;
pub mod s3_store;
