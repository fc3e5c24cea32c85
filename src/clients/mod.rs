pub mod discord_client;
pub mod feed_client;
