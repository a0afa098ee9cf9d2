//! The storefront GraphQL schema.
//!
//! Resolvers read the [`Clients`] and the catalog settings from the schema
//! data, so a schema built from mocks resolves exactly like the served one.

mod category;
mod checkout;

use std::sync::Arc;

use async_graphql::Context;
use async_graphql::EmptySubscription;
use async_graphql::ErrorExtensions;
use async_graphql::Object;
use async_graphql::Result;
use async_graphql::Schema;
use async_graphql::ID;

pub use self::category::Category;
pub use self::checkout::ItemInput;
pub use self::checkout::OrderForm;
use crate::category::CategoryTree;
use crate::category::CATEGORY_TREE_DEPTH;
use crate::clients::Clients;
use crate::configuration;

/// Query root.
#[derive(Clone, Copy, Debug, Default)]
pub struct Query;

#[Object]
impl Query {
    /// A category by id.
    async fn category(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Category>> {
        let clients = ctx.data::<Clients>()?;
        let category = clients
            .catalog
            .category(&id)
            .await
            .map_err(|error| error.extend())?;
        Ok(category.map(|category| Category::new(category, Arc::default())))
    }

    /// The category tree, down to `treeLevel` levels (at most three).
    async fn categories(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 3)] tree_level: usize,
    ) -> Result<Vec<Category>> {
        let tree_level = tree_level.clamp(1, CATEGORY_TREE_DEPTH);
        let clients = ctx.data::<Clients>()?;
        let tree = clients
            .catalog
            .categories(tree_level)
            .await
            .map_err(|error| error.extend())?;
        let request_tree = Arc::new(CategoryTree::default());
        Ok(tree
            .into_iter()
            .map(|category| Category::new(category, request_tree.clone()))
            .collect())
    }

    /// An order form by id.
    async fn order_form(&self, ctx: &Context<'_>, order_form_id: ID) -> Result<OrderForm> {
        let clients = ctx.data::<Clients>()?;
        let order_form = clients
            .checkout
            .order_form(&order_form_id)
            .await
            .map_err(|error| error.extend())?;
        Ok(OrderForm::from(order_form))
    }
}

/// Mutation root.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mutation;

/// The schema served by the storefront.
pub type StorefrontSchema = Schema<Query, Mutation, EmptySubscription>;

/// Builds the schema around `clients`.
pub fn build_schema(clients: Clients, catalog: configuration::Catalog) -> StorefrontSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(clients)
        .data(catalog)
        .finish()
}

/// The schema definition language of the storefront schema.
pub fn sdl() -> String {
    Schema::build(Query, Mutation, EmptySubscription)
        .finish()
        .sdl()
}
