pub mod change_message_service;
pub mod diff_service;
pub mod feed_parser;
pub mod snapshot_store;
