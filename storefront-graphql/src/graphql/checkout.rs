use async_graphql::Context;
use async_graphql::ErrorExtensions;
use async_graphql::InputObject;
use async_graphql::Object;
use async_graphql::Result;
use async_graphql::ID;

use super::Mutation;
use crate::checkout;
use crate::checkout::Item;
use crate::checkout::OrderFormItem;
use crate::clients::Clients;
use crate::marketing::MarketingData;
use crate::marketing::UtmParams;
use crate::marketing::UtmiParams;

/// An item to add to the cart.
#[derive(Clone, Debug, InputObject)]
pub struct ItemInput {
    /// The SKU id.
    pub id: ID,
    #[graphql(default = 1)]
    pub quantity: u32,
    /// The seller id.
    pub seller: ID,
}

impl From<ItemInput> for Item {
    fn from(input: ItemInput) -> Self {
        Item {
            id: input.id.0,
            quantity: input.quantity,
            seller: input.seller.0,
        }
    }
}

/// The shopper's cart.
#[derive(Clone, Debug)]
pub struct OrderForm(checkout::OrderForm);

impl From<checkout::OrderForm> for OrderForm {
    fn from(order_form: checkout::OrderForm) -> Self {
        Self(order_form)
    }
}

#[Object]
impl OrderForm {
    async fn cache_id(&self) -> ID {
        ID(self.0.order_form_id.clone())
    }

    async fn order_form_id(&self) -> ID {
        ID(self.0.order_form_id.clone())
    }

    /// Total in cents.
    async fn value(&self) -> i64 {
        self.0.value
    }

    async fn items(&self) -> &[OrderFormItem] {
        &self.0.items
    }

    async fn marketing_data(&self) -> Option<MarketingData> {
        self.0
            .marketing_data
            .as_ref()
            .map(MarketingData::from_record)
    }
}

#[Object]
impl Mutation {
    /// Adds items to the cart and records the campaign the shopper came from.
    async fn add_item(
        &self,
        ctx: &Context<'_>,
        order_form_id: ID,
        items: Vec<ItemInput>,
        utm_params: Option<UtmParams>,
        utmi_params: Option<UtmiParams>,
    ) -> Result<OrderForm> {
        let clients = ctx.data::<Clients>()?;
        let items: Vec<Item> = items.into_iter().map(Item::from).collect();
        let cart = checkout::add_item(
            clients.checkout.as_ref(),
            &order_form_id,
            &items,
            utm_params.as_ref(),
            utmi_params.as_ref(),
        )
        .await
        .map_err(|error| error.extend())?;
        Ok(OrderForm::from(cart))
    }
}
