//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod discord_http_client;
mod file_premium_entitlement_source;
mod in_memory_binding_store;
mod in_memory_identity_link_repository;
mod in_memory_setup_lock_coordinator;
mod postgres_binding_store;
mod redis_binding_store;
mod redis_identity_link_repository;
mod redis_setup_lock_coordinator;
mod roblox_http_client;

pub use discord_http_client::DiscordHttpClient;
pub use file_premium_entitlement_source::FilePremiumEntitlementSource;
pub use in_memory_binding_store::InMemoryBindingStore;
pub use in_memory_identity_link_repository::InMemoryIdentityLinkRepository;
pub use in_memory_setup_lock_coordinator::InMemorySetupLockCoordinator;
pub use postgres_binding_store::PostgresBindingStore;
pub use redis_binding_store::RedisBindingStore;
pub use redis_identity_link_repository::RedisIdentityLinkRepository;
pub use redis_setup_lock_coordinator::RedisSetupLockCoordinator;
pub use roblox_http_client::RobloxHttpClient;
