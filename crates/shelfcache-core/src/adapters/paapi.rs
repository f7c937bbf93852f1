use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::config::PaApiConfig;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::normalize::{decode_get_items, UpstreamItem};
use crate::signing::{RequestDescriptor, RequestSigner, SigV4Signer};
use crate::{Asin, ConfigError, SyncError, UpstreamError, ValidationError};

pub const GET_ITEMS_PATH: &str = "/paapi5/getitems";
pub const GET_ITEMS_TARGET: &str = "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.GetItems";
pub const SERVICE_NAME: &str = "ProductAdvertisingAPI";

/// Upstream cap on identifiers per GetItems call.
pub const MAX_ITEM_IDS: usize = 10;

/// Data facets requested for every item: images, title, byline, price, availability.
pub const GET_ITEMS_RESOURCES: &[&str] = &[
    "Images.Primary.Large",
    "Images.Primary.Medium",
    "Images.Primary.Small",
    "ItemInfo.Title",
    "ItemInfo.ByLineInfo",
    "Offers.Listings.Price",
    "Offers.Listings.Availability.Message",
];

/// Validated identifier set for one GetItems call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetItemsRequest {
    item_ids: Vec<Asin>,
}

impl GetItemsRequest {
    pub fn new(item_ids: Vec<Asin>) -> Result<Self, ValidationError> {
        if item_ids.is_empty() {
            return Err(ValidationError::EmptyItemIds);
        }
        if item_ids.len() > MAX_ITEM_IDS {
            return Err(ValidationError::TooManyItemIds {
                len: item_ids.len(),
                max: MAX_ITEM_IDS,
            });
        }
        Ok(Self { item_ids })
    }

    /// Split an arbitrary list into requests of at most [`MAX_ITEM_IDS`].
    pub fn chunked(item_ids: &[Asin]) -> Vec<Self> {
        item_ids
            .chunks(MAX_ITEM_IDS)
            .map(|chunk| Self {
                item_ids: chunk.to_vec(),
            })
            .collect()
    }

    pub fn item_ids(&self) -> &[Asin] {
        &self.item_ids
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetItemsPayload<'a> {
    item_ids: Vec<&'a str>,
    item_id_type: &'static str,
    partner_tag: &'a str,
    partner_type: &'static str,
    marketplace: &'a str,
    resources: &'static [&'static str],
}

/// Source of decoded upstream catalog items.
pub trait CatalogSource: Send + Sync {
    fn get_items<'a>(
        &'a self,
        request: &'a GetItemsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<UpstreamItem>, SyncError>> + Send + 'a>>;
}

/// Product Advertising API 5.0 GetItems adapter.
#[derive(Clone)]
pub struct PaApiClient {
    config: PaApiConfig,
    http_client: Arc<dyn HttpClient>,
    signer: Arc<dyn RequestSigner>,
}

impl PaApiClient {
    pub fn new(config: PaApiConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::default()))
    }

    pub fn with_http_client(config: PaApiConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
            signer: Arc::new(SigV4Signer),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = signer;
        self
    }

    pub fn config(&self) -> &PaApiConfig {
        &self.config
    }

    /// Build the signed GetItems request.
    ///
    /// Fails with [`ConfigError::Missing`] when any credential is absent.
    pub fn signed_request(
        &self,
        request: &GetItemsRequest,
        at: OffsetDateTime,
    ) -> Result<HttpRequest, ConfigError> {
        let credentials = self.config.credentials()?;

        let payload = GetItemsPayload {
            item_ids: request.item_ids.iter().map(Asin::as_str).collect(),
            item_id_type: "ASIN",
            partner_tag: &credentials.partner_tag,
            partner_type: "Associates",
            marketplace: &self.config.marketplace,
            resources: GET_ITEMS_RESOURCES,
        };
        let body = serde_json::to_string(&payload).map_err(|error| ConfigError::Invalid {
            name: "GetItems payload",
            reason: error.to_string(),
        })?;

        let unsigned = HttpRequest::post(format!("https://{}{GET_ITEMS_PATH}", self.config.host))
            .with_header("content-encoding", "amz-1.0")
            .with_header("content-type", "application/json; charset=utf-8")
            .with_header("x-amz-target", GET_ITEMS_TARGET);

        let descriptor = RequestDescriptor {
            method: unsigned.method,
            host: &self.config.host,
            path: GET_ITEMS_PATH,
            headers: &unsigned.headers,
            body: &body,
            region: &self.config.region,
            service: SERVICE_NAME,
        };
        let signed = self.signer.signed_headers(&descriptor, &credentials, at)?;

        Ok(unsigned.with_headers(signed).with_body(body))
    }

    async fn fetch(&self, request: &GetItemsRequest) -> Result<Vec<UpstreamItem>, SyncError> {
        let http_request = self.signed_request(request, OffsetDateTime::now_utc())?;

        debug!(
            host = %self.config.host,
            item_count = request.item_ids.len(),
            "calling GetItems"
        );
        let response = self
            .http_client
            .execute(http_request)
            .await
            .map_err(|error| UpstreamError::Transport(error.message().to_owned()))?;

        if !response.is_success() {
            let code = decode_get_items(&response.body)
                .ok()
                .and_then(|decoded| decoded.errors.into_iter().next())
                .and_then(|entry| entry.code);
            warn!(status = response.status, code = ?code, "GetItems returned non-success status");
            return Err(UpstreamError::Status {
                status: response.status,
                code,
            }
            .into());
        }

        let decoded = decode_get_items(&response.body)?;
        if let Some(first) = decoded.errors.first() {
            let error = UpstreamError::Reported {
                count: decoded.errors.len(),
                code: first.code.clone().unwrap_or_else(|| String::from("Unknown")),
                message: first.message.clone().unwrap_or_default(),
            };
            warn!(%error, "GetItems reported errors");
            return Err(error.into());
        }

        Ok(decoded.items_result.map(|result| result.items).unwrap_or_default())
    }
}

impl CatalogSource for PaApiClient {
    fn get_items<'a>(
        &'a self,
        request: &'a GetItemsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<UpstreamItem>, SyncError>> + Send + 'a>> {
        Box::pin(self.fetch(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse, RecordingHttpClient};
    use time::format_description::well_known::Rfc3339;

    fn asins(values: &[&str]) -> Vec<Asin> {
        values
            .iter()
            .map(|value| Asin::parse(value).expect("valid asin"))
            .collect()
    }

    fn configured() -> PaApiConfig {
        PaApiConfig::default().with_credentials("AKIDEXAMPLE", "secret", "shop-20")
    }

    #[test]
    fn request_rejects_more_than_ten_ids() {
        let ids: Vec<Asin> = (0..11)
            .map(|n| Asin::parse(&format!("B{n:09}")).expect("valid asin"))
            .collect();

        let err = GetItemsRequest::new(ids).expect_err("eleven ids");
        assert_eq!(err, ValidationError::TooManyItemIds { len: 11, max: 10 });
        assert_eq!(
            GetItemsRequest::new(Vec::new()).expect_err("no ids"),
            ValidationError::EmptyItemIds
        );
    }

    #[test]
    fn chunking_respects_upstream_cap() {
        let ids: Vec<Asin> = (0..23)
            .map(|n| Asin::parse(&format!("B{n:09}")).expect("valid asin"))
            .collect();
        let sizes: Vec<usize> = GetItemsRequest::chunked(&ids)
            .iter()
            .map(|chunk| chunk.item_ids().len())
            .collect();
        assert_eq!(sizes, vec![10, 10, 3]);
    }

    #[test]
    fn signed_request_carries_body_and_sigv4_headers() {
        let client = PaApiClient::with_http_client(
            configured(),
            Arc::new(RecordingHttpClient::ok_json("{}")),
        );
        let request = GetItemsRequest::new(asins(&["B000000001"])).expect("valid request");
        let at = OffsetDateTime::parse("2024-03-05T07:08:09Z", &Rfc3339).expect("timestamp");

        let signed = client.signed_request(&request, at).expect("credentials present");

        assert_eq!(signed.url, "https://webservices.amazon.com/paapi5/getitems");
        assert_eq!(signed.header("x-amz-target"), Some(GET_ITEMS_TARGET));
        assert_eq!(signed.header("x-amz-date"), Some("20240305T070809Z"));
        assert!(signed
            .header("authorization")
            .is_some_and(|value| value.starts_with(
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240305/us-east-1/ProductAdvertisingAPI/aws4_request"
            )));

        let body: serde_json::Value =
            serde_json::from_str(signed.body.as_deref().expect("body")).expect("json body");
        assert_eq!(body["ItemIds"], serde_json::json!(["B000000001"]));
        assert_eq!(body["PartnerTag"], "shop-20");
        assert_eq!(body["PartnerType"], "Associates");
        assert_eq!(body["Marketplace"], "www.amazon.com");
        assert_eq!(body["Resources"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn missing_credentials_short_circuit_before_network() {
        let http = Arc::new(RecordingHttpClient::ok_json("{}"));
        let client = PaApiClient::with_http_client(PaApiConfig::default(), http.clone());
        let request = GetItemsRequest::new(asins(&["B000000001"])).expect("valid request");

        let err = client.get_items(&request).await.expect_err("no credentials");

        assert!(matches!(err, SyncError::Config(ConfigError::Missing(_))));
        assert!(http.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn upstream_error_list_fails_the_call() {
        let http = Arc::new(RecordingHttpClient::ok_json(
            r#"{"Errors":[{"Code":"ItemNotAccessible","Message":"not accessible"}]}"#,
        ));
        let client = PaApiClient::with_http_client(configured(), http);
        let request = GetItemsRequest::new(asins(&["B000000001"])).expect("valid request");

        let err = client.get_items(&request).await.expect_err("reported error");
        match err {
            SyncError::Upstream(UpstreamError::Reported { count, code, .. }) => {
                assert_eq!(count, 1);
                assert_eq!(code, "ItemNotAccessible");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_surfaces_error_code() {
        let http = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::with_status(
            429,
            r#"{"Errors":[{"Code":"TooManyRequests","Message":"slow down"}]}"#,
        ))));
        let client = PaApiClient::with_http_client(configured(), http);
        let request = GetItemsRequest::new(asins(&["B000000001"])).expect("valid request");

        let err = client.get_items(&request).await.expect_err("throttled");
        assert!(matches!(
            err,
            SyncError::Upstream(UpstreamError::Status { status: 429, code: Some(ref code) })
                if code == "TooManyRequests"
        ));
    }

    #[tokio::test]
    async fn transport_failure_maps_to_upstream_error() {
        let http = Arc::new(RecordingHttpClient::responding(Err(HttpError::new(
            "connection failed",
        ))));
        let client = PaApiClient::with_http_client(configured(), http);
        let request = GetItemsRequest::new(asins(&["B000000001"])).expect("valid request");

        let err = client.get_items(&request).await.expect_err("transport");
        assert_eq!(err.code(), "upstream.transport");
    }

    #[tokio::test]
    async fn successful_call_returns_decoded_items() {
        let http = Arc::new(RecordingHttpClient::ok_json(
            r#"{"ItemsResult":{"Items":[{"ASIN":"B000000001"},{"ASIN":"B000000002"}]}}"#,
        ));
        let client = PaApiClient::with_http_client(configured(), http.clone());
        let request =
            GetItemsRequest::new(asins(&["B000000001", "B000000002"])).expect("valid request");

        let items = client.get_items(&request).await.expect("items");
        assert_eq!(items.len(), 2);
        assert_eq!(http.recorded_requests().len(), 1);
    }
}
