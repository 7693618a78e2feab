//! Avniconf Client - HTTP gateway to the Avni server
//!
//! This crate provides the [`RemoteEntityGateway`](avniconf_core::RemoteEntityGateway)
//! implementation used against a live server:
//!
//! - [`avni`] - authenticated lookups and creations per entity kind
//! - [`payload`] - kind-specific creation bodies
//! - [`response`] - normalization of the server's lookup response shapes

pub mod avni;
pub mod payload;
pub mod response;

pub use avni::AvniClient;
