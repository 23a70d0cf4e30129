pub mod comment;
pub mod lottery;
pub mod platform;
pub mod request;
