use async_trait::async_trait;
use serde::Serialize;

use super::Checkout;
use super::PlatformClient;
use crate::checkout::Item;
use crate::checkout::OrderForm;
use crate::error::FetchError;
use crate::marketing::MarketingData;

const ORDER_FORM_PATH: [&str; 4] = ["api", "checkout", "pub", "orderForm"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItems<'a> {
    order_items: &'a [Item],
}

/// [`Checkout`] over the platform's checkout REST API.
#[derive(Clone, Debug)]
pub struct RestCheckout {
    client: PlatformClient,
}

impl RestCheckout {
    pub(crate) fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    fn order_form_endpoint(
        &self,
        order_form_id: &str,
        suffix: &[&str],
    ) -> Result<url::Url, FetchError> {
        self.client.endpoint(
            ORDER_FORM_PATH
                .iter()
                .copied()
                .chain(std::iter::once(order_form_id))
                .chain(suffix.iter().copied()),
        )
    }
}

#[async_trait]
impl Checkout for RestCheckout {
    async fn order_form(&self, order_form_id: &str) -> Result<OrderForm, FetchError> {
        let url = self.order_form_endpoint(order_form_id, &[])?;
        self.client.get(url).await
    }

    async fn add_item(
        &self,
        order_form_id: &str,
        items: &[Item],
    ) -> Result<OrderForm, FetchError> {
        let url = self.order_form_endpoint(order_form_id, &["items"])?;
        self.client
            .post(url, &AddItems { order_items: items })
            .await
    }

    async fn update_order_form_marketing_data(
        &self,
        order_form_id: &str,
        marketing_data: &MarketingData,
    ) -> Result<(), FetchError> {
        let url = self.order_form_endpoint(order_form_id, &["attachments", "marketingData"])?;
        self.client
            .post_ignoring_response(url, marketing_data)
            .await
    }
}
