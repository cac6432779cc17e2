use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Serialize;
use url::Url;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::value_objects::ObjectKey;

const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// HTTP methods a presigned link may grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkMethod {
    Get,
    Put,
}

impl LinkMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkMethod::Get => "GET",
            LinkMethod::Put => "PUT",
        }
    }
}

impl std::fmt::Display for LinkMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LinkMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" | "DOWNLOAD" => Ok(LinkMethod::Get),
            "PUT" | "UPLOAD" => Ok(LinkMethod::Put),
            other => Err(EngineError::invalid_input(format!(
                "presigned links support GET or PUT, not '{}'",
                other
            ))),
        }
    }
}

/// A freshly signed link together with its validity window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresignedLink {
    pub url: String,
    pub key: ObjectKey,
    pub method: LinkMethod,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignatureVersion {
    V2,
    V4,
}

/// Structured view of an existing presigned link.
///
/// Decoding never sees the signing secret, so `is_valid_signature_present`
/// only says a non-empty signature parameter exists. It is not a
/// cryptographic check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresignedLinkDescriptor {
    pub bucket: String,
    pub key: String,
    pub method: LinkMethod,
    pub signature_version: SignatureVersion,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub is_valid_signature_present: bool,
}

impl PresignedLinkDescriptor {
    /// Decompose a presigned S3 URL without any network access.
    ///
    /// Accepts SigV4 (`X-Amz-Date`, `X-Amz-Expires`, `X-Amz-Signature`) and
    /// legacy SigV2 (`Expires`, `Signature`) query shapes, with either
    /// path-style or virtual-hosted-style addressing.
    pub fn parse(link: &str) -> EngineResult<Self> {
        let url = Url::parse(link.trim())
            .map_err(|e| EngineError::malformed_link(format!("not a valid URL: {}", e)))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(EngineError::malformed_link(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| EngineError::malformed_link("URL has no host"))?;

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        let (signature_version, issued_at, expires_at, signature) = if params
            .keys()
            .any(|k| k.starts_with("X-Amz-"))
        {
            let issued_at = parse_amz_date(required(&params, "X-Amz-Date")?)?;
            let expires_in: i64 = required(&params, "X-Amz-Expires")?
                .parse()
                .map_err(|_| EngineError::malformed_link("X-Amz-Expires is not a number"))?;
            let expires_at = issued_at
                .checked_add_signed(TimeDelta::seconds(expires_in))
                .ok_or_else(|| EngineError::malformed_link("X-Amz-Expires out of range"))?;
            let signature = required(&params, "X-Amz-Signature")?;
            (SignatureVersion::V4, Some(issued_at), expires_at, signature)
        } else if params.contains_key("Signature") || params.contains_key("Expires") {
            let epoch: i64 = required(&params, "Expires")?
                .parse()
                .map_err(|_| EngineError::malformed_link("Expires is not a unix timestamp"))?;
            let expires_at = DateTime::from_timestamp(epoch, 0)
                .ok_or_else(|| EngineError::malformed_link("Expires out of range"))?;
            let signature = required(&params, "Signature")?;
            (SignatureVersion::V2, None, expires_at, signature)
        } else {
            return Err(EngineError::malformed_link(
                "no expiry or signature query parameters",
            ));
        };

        let (bucket, raw_key) = split_bucket_and_key(host, url.path())?;
        let key = urlencoding::decode(raw_key)
            .map_err(|_| EngineError::malformed_link("object key is not valid UTF-8"))?
            .into_owned();

        let method = match params.get("x-id").map(String::as_str) {
            Some("PutObject") => LinkMethod::Put,
            _ => LinkMethod::Get,
        };

        Ok(Self {
            bucket,
            key,
            method,
            signature_version,
            issued_at,
            expires_at,
            is_valid_signature_present: !signature.trim().is_empty(),
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds of validity between issue and expiry, when the issue time is known
    pub fn validity_seconds(&self) -> Option<i64> {
        self.issued_at
            .map(|issued| (self.expires_at - issued).num_seconds())
    }
}

fn required<'a>(params: &'a HashMap<String, String>, name: &str) -> EngineResult<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| EngineError::malformed_link(format!("missing '{}' query parameter", name)))
}

fn parse_amz_date(value: &str) -> EngineResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, AMZ_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| EngineError::malformed_link(format!("invalid X-Amz-Date '{}': {}", value, e)))
}

/// S3-compatible hosts that put the bucket in front of a fixed number of
/// labels (R2 account id, Spaces region)
const VIRTUAL_HOST_SUFFIXES: &[(&str, usize)] = &[
    (".r2.cloudflarestorage.com", 1),
    (".digitaloceanspaces.com", 1),
    (".storage.googleapis.com", 0),
];

/// Virtual-hosted links carry the bucket in the host (`bucket.s3.region.amazonaws.com`);
/// path-style links carry it as the first path segment. Hosts that match no
/// known provider layout, such as custom domains, are read path-style.
fn split_bucket_and_key<'a>(host: &str, path: &'a str) -> EngineResult<(String, &'a str)> {
    let path = path.trim_start_matches('/');

    let virtual_bucket = if host.starts_with("s3.") || host.starts_with("s3-") {
        None
    } else {
        host.find(".s3.")
            .or_else(|| host.find(".s3-"))
            .map(|idx| host[..idx].to_string())
            .or_else(|| provider_virtual_bucket(host))
    };

    let (bucket, key) = match virtual_bucket.as_deref() {
        Some(bucket) => (bucket, path),
        None => path
            .split_once('/')
            .ok_or_else(|| EngineError::malformed_link("path has no bucket and key"))?,
    };

    if bucket.is_empty() {
        return Err(EngineError::malformed_link("bucket is empty"));
    }
    if key.is_empty() {
        return Err(EngineError::malformed_link("object key is empty"));
    }

    Ok((bucket.to_string(), key))
}

fn provider_virtual_bucket(host: &str) -> Option<String> {
    VIRTUAL_HOST_SUFFIXES.iter().find_map(|(suffix, fixed_labels)| {
        let rest = host.strip_suffix(suffix)?;
        let labels: Vec<&str> = rest.split('.').collect();
        (labels.len() > *fixed_labels)
            .then(|| labels[..labels.len() - fixed_labels].join("."))
    })
}
