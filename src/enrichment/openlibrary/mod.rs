//! Open Library API integration
//!
//! Looks up works by title and fetches edition descriptions and rating
//! summaries from openlibrary.org.
//!
//! API docs: https://openlibrary.org/developers/api

pub mod dto;
mod adapter;
mod client;

pub use client::OpenLibraryClient;
