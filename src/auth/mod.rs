//! Authentication and authorization.
//!
//! Bearer-token authentication for the JSON API:
//! - Users log in via `/api/users/login` with email/password
//! - A signed JWT (HS256) is returned and passed back in
//!   `Authorization: Bearer <token>` on subsequent requests
//! - Tokens expire after a configurable interval (2 hours by default)
//!
//! Admin-only routes use the [`current_user::AdminUser`] extractor, which
//! confirms the admin grant against the users table on every request rather
//! than trusting the role claim baked into the token.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT creation and verification

pub mod current_user;
pub mod password;
pub mod session;
