pub mod cdn_url;
pub mod request;
