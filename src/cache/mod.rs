//! Cache module for storing API responses to disk
//!
//! This module provides a cache manager that persists the Pokémon list, detail
//! records and sprite images to the filesystem. Entries never expire: a readable
//! file at the derived path is a valid entry until it is overwritten.

mod manager;

pub use manager::{BinaryCodec, CacheCodec, CacheError, CacheKey, CacheManager, JsonCodec};
