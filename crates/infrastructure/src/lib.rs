//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_identity_repository;
mod in_memory_rate_limit_store;
mod jwt_token_codec;
mod postgres_identity_repository;
mod redis_rate_limit_store;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_identity_repository::InMemoryIdentityRepository;
pub use in_memory_rate_limit_store::InMemoryRateLimitStore;
pub use jwt_token_codec::{JwtTokenCodec, TokenLifetimes};
pub use postgres_identity_repository::PostgresIdentityRepository;
pub use redis_rate_limit_store::RedisRateLimitStore;
