//! MongoDB backend implementation for docbind.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend`
//! trait, enabling persistent document storage backed by MongoDB's query
//! engine.
//!
//! To use this backend through the facade crate, include the `mongodb` feature
//! in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docbind = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Async/await** - Fully asynchronous API built on MongoDB's async driver
//! - **Connection retries** - Builder retries with exponential backoff and a ping check
//! - **Indexing** - Support for creating named, optionally unique indexes
//!
//! # Connection
//!
//! A connection string and database name can be provided explicitly through
//! the builder, or read from the `MONGO_DB_CONNECTION_STRING` and
//! `MONGO_DB_NAME` environment variables.
//!
//! # Example
//!
//! ```ignore
//! use docbind::{backend::StoreBackendBuilder, mongodb::MongoStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MongoStore::builder("mongodb://localhost:27017", "appdb")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbind_mongodb;

pub mod store;

pub use store::{MongoStore, MongoStoreBuilder, CONNECTION_STRING_VAR, DATABASE_NAME_VAR};
