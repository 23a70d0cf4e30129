pub mod content_fetcher;
pub mod lottery_service;
pub mod selection_engine;
