/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! Comment lottery for Threads and Instagram posts.
//!
//! A request goes through [`session::session::SessionManager`] (is the post
//! public, and if not, which credentials to use), then
//! [`application::services::content_fetcher::ContentFetcher`] (retrieval with
//! retry, deadline and cancellation), then
//! [`application::services::selection_engine::SelectionEngine`], and ends in
//! [`storage::result_store::ResultStore`].
//! [`application::services::lottery_service::LotteryService`] wires them together.

pub mod config;

pub mod constants;

pub mod error;

pub mod application;

pub mod presentation;

pub mod session;

pub mod storage;

pub mod transport;

pub mod utils;
