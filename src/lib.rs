//! Social micro-blogging backend: accounts, posts, comments, likes,
//! bookmarks, follows, feeds, trending and search over SQLite.

pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod sentiment;
pub mod service;

pub use service::Microblog;
