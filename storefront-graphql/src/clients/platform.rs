use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::configuration::ConfigurationError;
use crate::configuration::Platform;
use crate::error::FetchError;

const APP_KEY_HEADER: &str = "x-vtex-api-appkey";
const APP_TOKEN_HEADER: &str = "x-vtex-api-apptoken";

/// A JSON client for one platform service.
#[derive(Clone, Debug)]
pub(crate) struct PlatformClient {
    service: &'static str,
    base_url: Url,
    http_client: reqwest::Client,
}

impl PlatformClient {
    pub(crate) fn new(
        service: &'static str,
        base_url: Url,
        platform: &Platform,
    ) -> Result<Self, ConfigurationError> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (APP_KEY_HEADER, &platform.app_key),
            (APP_TOKEN_HEADER, &platform.app_token),
        ] {
            if let Some(value) = value {
                let mut value = HeaderValue::from_str(value).map_err(|error| {
                    ConfigurationError::InvalidConfiguration {
                        message: "invalid platform credentials",
                        error: error.to_string(),
                    }
                })?;
                value.set_sensitive(true);
                headers.insert(name, value);
            }
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(platform.timeout)
            .build()
            .map_err(|error| ConfigurationError::InvalidConfiguration {
                message: "could not build the platform http client",
                error: error.to_string(),
            })?;

        Ok(Self {
            service,
            base_url,
            http_client,
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The url for `segments` below the base url. Segments are percent encoded.
    pub(crate) fn endpoint<I>(&self, segments: I) -> Result<Url, FetchError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::MalformedRequest {
                service: self.service.to_string(),
                reason: format!("'{}' cannot be a base url", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let response = self.execute(self.request(Method::GET, url)).await?;
        self.decode(response).await
    }

    /// Like [`PlatformClient::get`], with a 404 answered as `None`.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, FetchError> {
        match self.execute(self.request(Method::GET, url)).await {
            Ok(response) => self.decode(response).await.map(Some),
            Err(FetchError::SubrequestHttpError {
                status_code: Some(404),
                ..
            }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub(crate) async fn post<B, T>(&self, url: Url, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.request(Method::POST, url).json(body))
            .await?;
        self.decode(response).await
    }

    /// Posts `body` and discards whatever the service answers.
    pub(crate) async fn post_ignoring_response<B>(&self, url: Url, body: &B) -> Result<(), FetchError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, url).json(body))
            .await
            .map(|_| ())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(service = self.service, %method, %url, "calling platform");
        self.http_client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let response = request.send().await.map_err(|error| FetchError::SubrequestHttpError {
            status_code: error.status().map(|status| status.as_u16()),
            service: self.service.to_string(),
            reason: error.to_string(),
        })?;

        let status = response.status();
        tracing::trace!(service = self.service, %status, "platform responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(FetchError::SubrequestHttpError {
            status_code: Some(status.as_u16()),
            service: self.service.to_string(),
            reason: failure_reason(status, &body),
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, FetchError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|error| FetchError::SubrequestHttpError {
                status_code: error.status().map(|status| status.as_u16()),
                service: self.service.to_string(),
                reason: error.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|error| FetchError::SubrequestMalformedResponse {
            service: self.service.to_string(),
            reason: error.to_string(),
        })
    }
}

fn failure_reason(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    }
}
