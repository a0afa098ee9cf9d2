//! Marketing attribution attached to an order form.
//!
//! Campaign parameters arrive in two groups (UTM and UTMI) and are stored by the
//! platform as one flat record. [`MarketingData::from_params`] builds that
//! record and [`MarketingData::differs_from`] decides whether the stored copy
//! needs replacing.

use async_graphql::InputObject;
use async_graphql::SimpleObject;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// UTM parameters supplied by the caller.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, InputObject)]
#[graphql(name = "UTMParamsInput")]
pub struct UtmParams {
    /// `utm_source`
    pub source: Option<String>,
    /// `utm_medium`
    pub medium: Option<String>,
    /// `utm_campaign`
    pub campaign: Option<String>,
}

/// UTMI (internal navigation) parameters supplied by the caller.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, InputObject)]
#[graphql(name = "UTMIParamsInput")]
pub struct UtmiParams {
    /// `utmi_pc`, the part of the page the shopper came from.
    pub part: Option<String>,
    /// `utmi_p`, the page the shopper came from.
    pub page: Option<String>,
    /// `utmi_cp`
    pub campaign: Option<String>,
}

/// The flat marketing record sent to the platform.
///
/// Fields that were not supplied are left out of the serialized record.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "OrderFormMarketingData")]
pub struct MarketingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utmi_campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utmi_part: Option<String>,
    // The platform spells this key in lower case.
    #[serde(rename = "utmipage", skip_serializing_if = "Option::is_none")]
    #[graphql(name = "utmipage")]
    pub utmi_page: Option<String>,
}

impl MarketingData {
    /// Flattens the supplied groups, or returns `None` when neither was supplied.
    pub fn from_params(utm: Option<&UtmParams>, utmi: Option<&UtmiParams>) -> Option<Self> {
        if utm.is_none() && utmi.is_none() {
            return None;
        }

        let mut data = MarketingData::default();
        if let Some(utm) = utm {
            data.utm_source = utm.source.clone();
            data.utm_medium = utm.medium.clone();
            data.utm_campaign = utm.campaign.clone();
        }
        if let Some(utmi) = utmi {
            data.utmi_campaign = utmi.campaign.clone();
            data.utmi_part = utmi.part.clone();
            data.utmi_page = utmi.page.clone();
        }
        Some(data)
    }

    /// Reads the known keys of a stored record, ignoring the others.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let field = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);
        MarketingData {
            utm_source: field("utmSource"),
            utm_medium: field("utmMedium"),
            utm_campaign: field("utmCampaign"),
            utmi_campaign: field("utmiCampaign"),
            utmi_part: field("utmiPart"),
            utmi_page: field("utmipage"),
        }
    }

    /// The record as a JSON object, with absent fields omitted.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        let fields = [
            ("utmSource", &self.utm_source),
            ("utmMedium", &self.utm_medium),
            ("utmCampaign", &self.utm_campaign),
            ("utmiCampaign", &self.utmi_campaign),
            ("utmiPart", &self.utmi_part),
            ("utmipage", &self.utmi_page),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                record.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        record
    }

    /// Whether `stored` is a different record than this one.
    ///
    /// Both sides are compared as whole objects: a key the stored record has
    /// and this one lacks makes them different. `null` values count as absent
    /// and an absent stored record is an empty one.
    pub fn differs_from(&self, stored: Option<&Map<String, Value>>) -> bool {
        let stored = stored
            .map(|record| {
                record
                    .iter()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<Map<String, Value>>()
            })
            .unwrap_or_default();
        self.to_record() != stored
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

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

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn nothing_supplied_builds_nothing() {
        assert_eq!(MarketingData::from_params(None, None), None);
    }

    #[test]
    fn both_groups_flatten_into_six_keys() {
        let data = MarketingData::from_params(Some(&utm()), Some(&utmi())).unwrap();
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "utmSource": "source",
                "utmMedium": "medium",
                "utmCampaign": "campaign",
                "utmiCampaign": "campaign",
                "utmiPart": "part",
                "utmipage": "page"
            })
        );
        assert_eq!(
            Value::Object(data.to_record()),
            serde_json::to_value(&data).unwrap()
        );
    }

    #[test]
    fn absent_group_is_omitted() {
        let data = MarketingData::from_params(Some(&utm()), None).unwrap();
        assert_eq!(
            Value::Object(data.to_record()),
            json!({
                "utmSource": "source",
                "utmMedium": "medium",
                "utmCampaign": "campaign"
            })
        );
    }

    #[test]
    fn reads_known_keys_of_stored_record() {
        let stored = object(json!({
            "utmSource": "source",
            "utmipage": "page",
            "coupon": "SALE10",
            "marketingTags": ["summer"]
        }));
        assert_eq!(
            MarketingData::from_record(&stored),
            MarketingData {
                utm_source: Some("source".to_string()),
                utmi_page: Some("page".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn identical_record_does_not_differ() {
        let data = MarketingData::from_params(Some(&utm()), Some(&utmi())).unwrap();
        let stored = object(json!({
            "utmSource": "source",
            "utmMedium": "medium",
            "utmCampaign": "campaign",
            "utmiCampaign": "campaign",
            "utmiPart": "part",
            "utmipage": "page"
        }));
        assert!(!data.differs_from(Some(&stored)));
    }

    #[test]
    fn changed_value_differs() {
        let data = MarketingData::from_params(Some(&utm()), Some(&utmi())).unwrap();
        let stored = object(json!({
            "utmSource": "SOURCE DIFFERENT",
            "utmMedium": "medium",
            "utmCampaign": "campaign",
            "utmiCampaign": "campaign",
            "utmiPart": "part",
            "utmipage": "page"
        }));
        assert!(data.differs_from(Some(&stored)));
    }

    #[test]
    fn extra_stored_key_differs() {
        let data = MarketingData::from_params(Some(&utm()), None).unwrap();
        let stored = object(json!({
            "utmSource": "source",
            "utmMedium": "medium",
            "utmCampaign": "campaign",
            "utmiPart": "part"
        }));
        assert!(data.differs_from(Some(&stored)));
    }

    #[test]
    fn null_stored_values_count_as_absent() {
        let data = MarketingData::from_params(Some(&utm()), None).unwrap();
        let stored = object(json!({
            "utmSource": "source",
            "utmMedium": "medium",
            "utmCampaign": "campaign",
            "coupon": null,
            "utmiPart": null
        }));
        assert!(!data.differs_from(Some(&stored)));
    }

    #[test]
    fn missing_stored_record_is_empty() {
        let data = MarketingData::from_params(Some(&utm()), Some(&utmi())).unwrap();
        assert!(data.differs_from(None));

        let empty = MarketingData::from_params(Some(&UtmParams::default()), None).unwrap();
        assert!(!empty.differs_from(None));
    }
}
