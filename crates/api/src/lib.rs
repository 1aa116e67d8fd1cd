//! Marzipan API - e-commerce GraphQL backend.
//!
//! A single `/graphql` endpoint over `PostgreSQL`: accounts with bearer-token
//! authentication and role-based authorization, a product catalog, carts and
//! orders. The CLI crate reuses the repositories and password hashing for
//! seeding, which is why this is a library with a thin binary on top.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod models;
pub mod server;
pub mod state;
