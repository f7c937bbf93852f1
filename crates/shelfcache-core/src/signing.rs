//! Request signing for the upstream API.
//!
//! [`RequestSigner`] is the seam: the adapter hands over a request descriptor
//! plus credentials and receives the headers to attach. [`SigV4Signer`]
//! delegates AWS Signature Version 4 to the `aws-sigv4` crate.

use std::collections::BTreeMap;
use std::time::SystemTime;

use aws_credential_types::Credentials as AwsCredentials;
use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use time::OffsetDateTime;

use crate::config::Credentials;
use crate::http_client::HttpMethod;
use crate::ConfigError;

/// Everything a signer needs to know about an outgoing request.
#[derive(Debug, Clone, Copy)]
pub struct RequestDescriptor<'a> {
    pub method: HttpMethod,
    pub host: &'a str,
    pub path: &'a str,
    /// Lowercase header names to include in the signature.
    pub headers: &'a BTreeMap<String, String>,
    pub body: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

/// Produces authentication headers for a request.
pub trait RequestSigner: Send + Sync {
    fn signed_headers(
        &self,
        request: &RequestDescriptor<'_>,
        credentials: &Credentials,
        at: OffsetDateTime,
    ) -> Result<BTreeMap<String, String>, ConfigError>;
}

/// AWS Signature Version 4 via `aws-sigv4`. Returns `host`, `x-amz-date` and
/// `authorization`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigV4Signer;

impl RequestSigner for SigV4Signer {
    fn signed_headers(
        &self,
        request: &RequestDescriptor<'_>,
        credentials: &Credentials,
        at: OffsetDateTime,
    ) -> Result<BTreeMap<String, String>, ConfigError> {
        let identity: Identity = AwsCredentials::new(
            credentials.access_key.clone(),
            credentials.secret_key.clone(),
            None,
            None,
            "shelfcache",
        )
        .into();

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(request.region)
            .name(request.service)
            .time(SystemTime::from(at))
            .settings(SigningSettings::default())
            .build()
            .map_err(signing_failed)?
            .into();

        let mut headers: BTreeMap<String, String> = request
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        headers.insert(String::from("host"), request.host.to_owned());

        let url = format!("https://{}{}", request.host, request.path);
        let signable = SignableRequest::new(
            request.method.as_str(),
            url.as_str(),
            headers
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
            SignableBody::Bytes(request.body.as_bytes()),
        )
        .map_err(signing_failed)?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(signing_failed)?
            .into_parts();

        let mut out = BTreeMap::new();
        out.insert(String::from("host"), request.host.to_owned());
        for (name, value) in instructions.headers() {
            out.insert(name.to_ascii_lowercase(), value.to_owned());
        }
        Ok(out)
    }
}

fn signing_failed(error: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        name: "request signature",
        reason: error.to_string(),
    }
}
