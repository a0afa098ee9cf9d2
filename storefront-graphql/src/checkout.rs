//! Cart mutations.

use async_graphql::SimpleObject;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::clients::Checkout;
use crate::error::FetchError;
use crate::marketing::MarketingData;
use crate::marketing::UtmParams;
use crate::marketing::UtmiParams;

/// The platform's in-progress cart.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub order_form_id: String,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub items: Vec<OrderFormItem>,
    /// Kept as a raw object: every stored key takes part in marketing comparisons.
    #[serde(default)]
    pub marketing_data: Option<Map<String, Value>>,
}

/// A line of the cart.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct OrderFormItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub seller: String,
    #[serde(default)]
    pub price: Option<i64>,
}

/// An item to add to the cart.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Item {
    pub id: String,
    pub quantity: u32,
    pub seller: String,
}

/// Adds `items` to the order form, then attaches the supplied marketing
/// parameters when they differ from the ones already stored.
///
/// The add-item call always happens first. The order form is only fetched
/// when at least one parameter group was supplied. The order form returned
/// by the add-item call is handed back.
pub async fn add_item(
    checkout: &dyn Checkout,
    order_form_id: &str,
    items: &[Item],
    utm_params: Option<&UtmParams>,
    utmi_params: Option<&UtmiParams>,
) -> Result<OrderForm, FetchError> {
    let cart = checkout.add_item(order_form_id, items).await?;

    let Some(marketing_data) = MarketingData::from_params(utm_params, utmi_params) else {
        return Ok(cart);
    };

    let order_form = checkout.order_form(order_form_id).await?;
    if marketing_data.differs_from(order_form.marketing_data.as_ref()) {
        tracing::debug!(order_form_id, "updating order form marketing data");
        checkout
            .update_order_form_marketing_data(order_form_id, &marketing_data)
            .await?;
    } else {
        tracing::trace!(order_form_id, "order form marketing data unchanged");
    }

    Ok(cart)
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::clients::MockCheckout;

    const ORDER_FORM_ID: &str = "98a54dd4b5ca4b8bbc5e4d7f8e3f5e6b";

    fn order_form() -> OrderForm {
        OrderForm {
            order_form_id: ORDER_FORM_ID.to_string(),
            value: 0,
            items: Vec::new(),
            marketing_data: None,
        }
    }

    fn order_form_with(marketing_data: Value) -> OrderForm {
        OrderForm {
            marketing_data: marketing_data.as_object().cloned(),
            ..order_form()
        }
    }

    fn item() -> Item {
        Item {
            id: "100".to_string(),
            quantity: 1,
            seller: "1".to_string(),
        }
    }

    fn utm() -> UtmParams {
        UtmParams {
            source: Some("source".to_string()),
            medium: Some("medium".to_string()),
            campaign: Some("campaign".to_string()),
        }
    }

    fn utmi() -> UtmiParams {
        UtmiParams {
            part: Some("part".to_string()),
            page: Some("page".to_string()),
            campaign: Some("campaign".to_string()),
        }
    }

    fn expected_marketing_data() -> MarketingData {
        MarketingData {
            utm_source: Some("source".to_string()),
            utm_medium: Some("medium".to_string()),
            utm_campaign: Some("campaign".to_string()),
            utmi_campaign: Some("campaign".to_string()),
            utmi_part: Some("part".to_string()),
            utmi_page: Some("page".to_string()),
        }
    }

    fn expect_add_item(checkout: &mut MockCheckout, seq: &mut Sequence) {
        checkout
            .expect_add_item()
            .withf(|id, items| id == ORDER_FORM_ID && items == [item()].as_slice())
            .times(1)
            .in_sequence(seq)
            .returning(|_, _| Ok(order_form()));
    }

    #[tokio::test]
    async fn adds_item_without_marketing_data() {
        let mut checkout = MockCheckout::new();
        let mut seq = Sequence::new();
        expect_add_item(&mut checkout, &mut seq);
        checkout.expect_order_form().never();
        checkout.expect_update_order_form_marketing_data().never();

        let cart = add_item(&checkout, ORDER_FORM_ID, &[item()], None, None)
            .await
            .unwrap();
        assert_eq!(cart.order_form_id, ORDER_FORM_ID);
    }

    #[tokio::test]
    async fn updates_marketing_data_when_order_form_has_none() {
        let mut checkout = MockCheckout::new();
        let mut seq = Sequence::new();
        expect_add_item(&mut checkout, &mut seq);
        checkout
            .expect_order_form()
            .withf(|id| id == ORDER_FORM_ID)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(order_form()));
        checkout
            .expect_update_order_form_marketing_data()
            .withf(|id, data| id == ORDER_FORM_ID && *data == expected_marketing_data())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        add_item(&checkout, ORDER_FORM_ID, &[item()], Some(&utm()), Some(&utmi()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn skips_identical_marketing_data() {
        let mut checkout = MockCheckout::new();
        let mut seq = Sequence::new();
        expect_add_item(&mut checkout, &mut seq);
        checkout
            .expect_order_form()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(order_form_with(json!({
                    "utmSource": "source",
                    "utmMedium": "medium",
                    "utmCampaign": "campaign",
                    "utmiCampaign": "campaign",
                    "utmiPart": "part",
                    "utmipage": "page"
                })))
            });
        checkout.expect_update_order_form_marketing_data().never();

        add_item(&checkout, ORDER_FORM_ID, &[item()], Some(&utm()), Some(&utmi()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn updates_different_marketing_data() {
        let mut checkout = MockCheckout::new();
        let mut seq = Sequence::new();
        expect_add_item(&mut checkout, &mut seq);
        checkout
            .expect_order_form()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(order_form_with(json!({
                    "utmSource": "SOURCE DIFFERENT",
                    "utmMedium": "medium",
                    "utmCampaign": "campaign",
                    "utmiCampaign": "campaign",
                    "utmiPart": "part",
                    "utmipage": "page"
                })))
            });
        checkout
            .expect_update_order_form_marketing_data()
            .withf(|id, data| id == ORDER_FORM_ID && *data == expected_marketing_data())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        add_item(&checkout, ORDER_FORM_ID, &[item()], Some(&utm()), Some(&utmi()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn partial_update_replaces_record_with_extra_stored_keys() {
        let mut checkout = MockCheckout::new();
        let mut seq = Sequence::new();
        expect_add_item(&mut checkout, &mut seq);
        checkout
            .expect_order_form()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(order_form_with(json!({
                    "utmSource": "source",
                    "utmMedium": "medium",
                    "utmCampaign": "campaign",
                    "utmiPart": "part"
                })))
            });
        checkout
            .expect_update_order_form_marketing_data()
            .withf(|_, data| {
                *data
                    == MarketingData {
                        utm_source: Some("source".to_string()),
                        utm_medium: Some("medium".to_string()),
                        utm_campaign: Some("campaign".to_string()),
                        ..Default::default()
                    }
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        add_item(&checkout, ORDER_FORM_ID, &[item()], Some(&utm()), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn add_item_failure_stops_the_mutation() {
        let mut checkout = MockCheckout::new();
        checkout.expect_add_item().times(1).returning(|_, _| {
            Err(FetchError::SubrequestHttpError {
                status_code: Some(500),
                service: "checkout".to_string(),
                reason: "boom".to_string(),
            })
        });
        checkout.expect_order_form().never();
        checkout.expect_update_order_form_marketing_data().never();

        let error = add_item(&checkout, ORDER_FORM_ID, &[item()], Some(&utm()), None)
            .await
            .unwrap_err();
        assert_eq!(error.service(), "checkout");
    }

    #[tokio::test]
    async fn order_form_failure_propagates() {
        let mut checkout = MockCheckout::new();
        let mut seq = Sequence::new();
        expect_add_item(&mut checkout, &mut seq);
        checkout
            .expect_order_form()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(FetchError::SubrequestMalformedResponse {
                    service: "checkout".to_string(),
                    reason: "missing field `orderFormId`".to_string(),
                })
            });
        checkout.expect_update_order_form_marketing_data().never();

        let error = add_item(&checkout, ORDER_FORM_ID, &[item()], None, Some(&utmi()))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            FetchError::SubrequestMalformedResponse { .. }
        ));
    }
}
