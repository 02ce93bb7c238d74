//! # Identity Server Library
//!
//! Identity and session integrity for a user-facing service:
//! - Validated value objects (username, email, password, role) and entity tags
//! - PASETO v4.local access and refresh tokens
//! - Login sessions
//! - User updates guarded by optimistic concurrency (`If-Match` / `ETag`)
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Value objects, entities, validated requests and repository traits
//! - **Application Layer**: User, token, session and login services plus DTOs
//! - **Infrastructure Layer**: PostgreSQL and in-memory repositories, metrics
//! - **Presentation Layer**: HTTP handlers, extractors and middleware
//!
//! ## Module Structure
//!
//! ```text
//! identity_server/
//! +-- config/         Configuration management
//! +-- domain/         Value objects, entities, requests and traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, repositories and metrics
//! +-- presentation/   HTTP routes, handlers and middleware
//! +-- shared/         Common utilities (errors, duration parsing)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
