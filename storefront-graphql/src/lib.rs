//! GraphQL resolvers for a commerce storefront.
//!
//! Mutations and type fields are mapped onto the platform's checkout and
//! catalog REST APIs. The clients are injected into the schema as
//! [`clients::Clients`] so every resolver can be exercised against mocks.

pub mod category;
pub mod checkout;
pub mod clients;
pub mod configuration;
mod error;
mod executable;
pub mod graphql;
pub mod marketing;
pub mod server;

pub use crate::configuration::Configuration;
pub use crate::error::FetchError;
pub use crate::executable::main;
pub use crate::graphql::StorefrontSchema;
