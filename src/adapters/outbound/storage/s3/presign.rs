//! SigV4 query-string signing for presigned object links
//!
//! Links name the S3 action in an `x-id` query parameter that is part of the
//! signed query, so decoding a link recovers the method it was issued for.

use std::{collections::BTreeMap, fmt::Write, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{digest::InvalidLength, Hmac, Mac};
use http::Method;
use object_store::{
    aws::{AwsCredential, AwsCredentialProvider},
    path::Path,
    signer::Signer,
    CredentialProvider,
};
use sha2::{Digest, Sha256};
use url::{Position, Url};

use super::S3Config;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
const STORE: &str = "S3";

/// Signs path-style object URLs with the store's own credentials
#[derive(Debug)]
pub struct S3LinkSigner {
    credentials: AwsCredentialProvider,
    region: String,
    bucket_endpoint: String,
}

impl S3LinkSigner {
    pub fn new(credentials: AwsCredentialProvider, config: &S3Config) -> Self {
        Self {
            credentials,
            region: config.region.clone(),
            bucket_endpoint: bucket_endpoint(config),
        }
    }
}

/// Path-style bucket address, matching how `AmazonS3` addresses the bucket
fn bucket_endpoint(config: &S3Config) -> String {
    match &config.endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket),
        None => format!("https://s3.{}.amazonaws.com/{}", config.region, config.bucket),
    }
}

fn action_for(method: &Method) -> &'static str {
    if *method == Method::PUT {
        "PutObject"
    } else {
        "GetObject"
    }
}

fn generic(message: String) -> object_store::Error {
    object_store::Error::Generic {
        store: STORE,
        source: message.into(),
    }
}

#[async_trait]
impl Signer for S3LinkSigner {
    async fn signed_url(
        &self,
        method: Method,
        path: &Path,
        expires_in: Duration,
    ) -> object_store::Result<Url> {
        let credential = self.credentials.get_credential().await?;

        let location = format!(
            "{}/{}",
            self.bucket_endpoint,
            uri_encode(path.as_ref(), false)
        );
        let mut url = Url::parse(&location)
            .map_err(|e| generic(format!("Unable to parse url {}: {}", location, e)))?;

        sign_url(
            &mut url,
            &credential,
            &self.region,
            &method,
            expires_in,
            Utc::now(),
            Some(action_for(&method)),
        )
        .map_err(|e| generic(format!("Unable to sign url {}: {}", location, e)))?;

        Ok(url)
    }
}

/// Replace the query of `url` with a SigV4 presigned query.
///
/// Only the `host` header is signed and the payload is left unsigned, so the
/// holder of the link sends the body directly.
fn sign_url(
    url: &mut Url,
    credential: &AwsCredential,
    region: &str,
    method: &Method,
    expires_in: Duration,
    now: DateTime<Utc>,
    action: Option<&str>,
) -> Result<(), InvalidLength> {
    let date = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let scope = format!("{}/{}/{}/aws4_request", date, region, SERVICE);

    let mut params = BTreeMap::new();
    params.insert("X-Amz-Algorithm", ALGORITHM.to_string());
    params.insert(
        "X-Amz-Credential",
        format!("{}/{}", credential.key_id, scope),
    );
    params.insert("X-Amz-Date", amz_date.clone());
    params.insert("X-Amz-Expires", expires_in.as_secs().to_string());
    params.insert("X-Amz-SignedHeaders", "host".to_string());
    if let Some(token) = &credential.token {
        params.insert("X-Amz-Security-Token", token.clone());
    }
    if let Some(action) = action {
        params.insert("x-id", action.to_string());
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k, true), uri_encode(v, true)))
        .collect::<Vec<_>>()
        .join("&");

    let host = url[Position::BeforeHost..Position::AfterPort].to_string();
    let canonical_request = format!(
        "{}\n{}\n{}\nhost:{}\n\nhost\n{}",
        method.as_str(),
        url.path(),
        query,
        host,
        UNSIGNED_PAYLOAD
    );

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let mut signing_key = format!("AWS4{}", credential.secret_key).into_bytes();
    for part in [date.as_str(), region, SERVICE, "aws4_request"] {
        signing_key = hmac_sha256(&signing_key, part.as_bytes())?;
    }
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

    url.set_query(Some(&format!("{}&X-Amz-Signature={}", query, signature)));
    Ok(())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// RFC 3986 encoding; `/` survives unless `encode_slash`
fn uri_encode(value: &str, encode_slash: bool) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            b'/' if !encode_slash => encoded.push('/'),
            _ => {
                let _ = write!(encoded, "%{:02X}", byte);
            }
        }
    }
    encoded
}
