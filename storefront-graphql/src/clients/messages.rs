use async_trait::async_trait;
use serde::Serialize;

use super::Messages;
use super::PlatformClient;
use crate::error::FetchError;

/// [`Messages`] that never translates.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughMessages;

#[async_trait]
impl Messages for PassthroughMessages {
    async fn message(
        &self,
        _key: &str,
        default: &str,
        _entity_id: &str,
    ) -> Result<String, FetchError> {
        Ok(default.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    to: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Message<'a> {
    key: &'a str,
    default: &'a str,
    entity_id: &'a str,
}

/// [`Messages`] backed by a translation endpoint.
///
/// The endpoint receives the messages to translate and answers with one
/// string per message, in order.
#[derive(Clone, Debug)]
pub struct RestMessages {
    client: PlatformClient,
    locale: String,
}

impl RestMessages {
    pub(crate) fn new(client: PlatformClient, locale: String) -> Self {
        Self { client, locale }
    }
}

#[async_trait]
impl Messages for RestMessages {
    async fn message(
        &self,
        key: &str,
        default: &str,
        entity_id: &str,
    ) -> Result<String, FetchError> {
        let request = TranslateRequest {
            to: &self.locale,
            messages: [Message {
                key,
                default,
                entity_id,
            }],
        };
        let translated: Vec<Option<String>> = self
            .client
            .post(self.client.base_url().clone(), &request)
            .await?;
        Ok(translated
            .into_iter()
            .next()
            .flatten()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }
}
