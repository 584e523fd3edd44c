pub mod get_client_ip;
pub mod media_url;
pub mod valid_id;
