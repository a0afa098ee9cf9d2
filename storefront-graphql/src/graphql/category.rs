use std::sync::Arc;

use async_graphql::Context;
use async_graphql::ErrorExtensions;
use async_graphql::Object;
use async_graphql::Result;
use async_graphql::ID;

use crate::category::category_href;
use crate::category::slug;
use crate::category::CategoryRecord;
use crate::category::CategoryTree;
use crate::clients::Clients;
use crate::configuration;

const NAME_MESSAGE_KEY: &str = "category.name";

/// A catalog category.
///
/// Categories resolved from the same root field share one [`CategoryTree`],
/// so the tree is fetched at most once per request.
#[derive(Clone, Debug)]
pub struct Category {
    record: CategoryRecord,
    tree: Arc<CategoryTree>,
}

impl Category {
    pub(crate) fn new(record: CategoryRecord, tree: Arc<CategoryTree>) -> Self {
        Self { record, tree }
    }

    async fn info(&self, ctx: &Context<'_>) -> Result<Option<CategoryRecord>> {
        let clients = ctx.data::<Clients>()?;
        self.tree
            .category_info(clients.catalog.as_ref(), &self.record.id)
            .await
            .map_err(|error| error.extend())
    }
}

#[Object]
impl Category {
    async fn id(&self) -> ID {
        ID(self.record.id.clone())
    }

    async fn cache_id(&self) -> ID {
        ID(self.record.id.clone())
    }

    /// Storefront path of the category, `/d` terminated for departments.
    async fn href(&self, ctx: &Context<'_>) -> Result<String> {
        let settings = ctx.data::<configuration::Catalog>()?;
        let category = self.info(ctx).await?;
        let url = category.as_ref().map_or("", |category| category.url.as_str());
        Ok(category_href(&settings.url_host_pattern, url))
    }

    async fn meta_tag_description(&self) -> Option<&str> {
        self.record.meta_tag_description.as_deref()
    }

    /// The localized name.
    async fn name(&self, ctx: &Context<'_>) -> Result<String> {
        let clients = ctx.data::<Clients>()?;
        clients
            .messages
            .message(NAME_MESSAGE_KEY, &self.record.name, &self.record.id)
            .await
            .map_err(|error| error.extend())
    }

    /// Last segment of the category url.
    async fn slug(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let category = self.info(ctx).await?;
        Ok(category.and_then(|category| slug(&category.url)))
    }

    async fn title_tag(&self) -> Option<&str> {
        self.record.title.as_deref()
    }

    async fn children(&self, ctx: &Context<'_>) -> Result<Option<Vec<Category>>> {
        let category = self.info(ctx).await?;
        Ok(category.map(|category| {
            category
                .children
                .into_iter()
                .map(|child| Category::new(child, self.tree.clone()))
                .collect()
        }))
    }
}
