/// Token subsystem: signed access tokens, persisted refresh tokens, and the
/// URL-safe codec for emailed purpose tokens.

pub mod access;
pub mod purpose;
pub mod refresh;

pub use access::{AccessClaims, AccessTokenIssuer, IssuedAccessToken};
pub use refresh::RefreshTokenStore;
