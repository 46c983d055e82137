//! Supabase-backed collaborators for the session manager.
//!
//! [`SupabaseDirectory`] implements the user directory over the REST
//! `users` table; [`SupabaseAuth`] implements the remote session layer
//! over the auth endpoints.

pub mod client;
pub mod remote;
pub mod seed;

pub use client::SupabaseDirectory;
pub use remote::SupabaseAuth;
pub use seed::{demo_accounts, ensure_demo_accounts};
