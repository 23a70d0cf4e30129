pub mod http_client;
pub mod retrieval_client;
