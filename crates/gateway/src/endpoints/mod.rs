//! # Gatewayエンドポイント

pub mod sign;
pub mod signing_info;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use sign::handle_sign;
pub use signing_info::handle_signing_info;
