use std::{process::ExitCode, time::Duration};

use anyhow::{bail, Context, Result};
use bucket_ext_rename::{
    app::{AppBuilder, AppConfig, AppServices, StorageBackend},
    EngineSettings, Extension, FingerprintKind, LinkMethod, ObjectKey, Prefix,
    PresignedLinkService, RenameRequest, RenameService, VerificationRequest,
    VerificationService,
};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "bucket-ext-rename")]
#[command(about = "Bulk-rename object extensions, verify uploads and handle presigned links", long_about = None)]
struct Cli {
    /// Storage backend type (memory, s3, minio)
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    storage_backend: String,

    /// S3 endpoint URL (for S3-compatible and MinIO backends)
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Bucket name
    #[arg(short, long, env = "S3_BUCKET")]
    bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY", hide_env_values = true)]
    s3_secret_key: Option<String>,

    /// Temporary session token
    #[arg(long, env = "S3_SESSION_TOKEN", hide_env_values = true)]
    s3_session_token: Option<String>,

    /// Use SSL for MinIO connection
    #[arg(long, env = "MINIO_USE_SSL", default_value = "false")]
    minio_use_ssl: bool,

    /// Parallel requests per batch
    #[arg(long, env = "RENAME_CONCURRENCY", default_value = "8")]
    concurrency: usize,

    /// Timeout for each provider request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the bucket is reachable with the given credentials
    TestConnection,

    /// Show folders and files directly under a prefix
    Browse {
        /// Folder to browse, empty for the bucket root. A missing trailing
        /// `/` is added, so `2024` means `2024/`
        #[arg(default_value = "")]
        prefix: String,
    },

    /// Preview which objects would be renamed
    Plan {
        #[command(flatten)]
        rename: RenameArgs,
    },

    /// Rename the selected objects
    Apply {
        #[command(flatten)]
        rename: RenameArgs,
        /// Source keys to rename
        #[arg(long = "select", conflicts_with = "all")]
        select: Vec<String>,
        /// Rename every planned object
        #[arg(long)]
        all: bool,
        /// Delete each original after a successful copy
        #[arg(long)]
        delete_original: bool,
        /// Permit deleting originals across the whole bucket
        #[arg(long)]
        allow_root: bool,
    },

    /// Compare an object against an expected fingerprint
    Verify {
        /// Object key
        key: String,
        /// Expected fingerprint (etag, byte count or hex digest)
        expected: String,
        /// Fingerprint kind: etag, length, md5, sha256
        #[arg(long, default_value = "etag")]
        kind: String,
    },

    /// Upload a local file
    Upload {
        /// Object key
        key: String,
        /// File path to upload
        file: String,
    },

    /// Generate a presigned link
    Presign {
        /// Object key
        key: String,
        /// GET (download) or PUT (upload)
        #[arg(long, default_value = "GET")]
        method: String,
        /// Link lifetime in seconds
        #[arg(long, default_value = "3600")]
        ttl_secs: u64,
    },

    /// Decompose a presigned link without contacting the provider
    ParseLink {
        /// The full link
        link: String,
    },
}

#[derive(clap::Args, Debug)]
struct RenameArgs {
    /// Folder to search, empty for the bucket root. Prefixes are folders: a
    /// missing trailing `/` is added, so `2024` matches `2024/a.txt` but not
    /// `2024-01.txt`
    #[arg(default_value = "")]
    prefix: String,
    /// Extension to replace
    #[arg(long)]
    from: String,
    /// Replacement extension
    #[arg(long)]
    to: String,
    /// Descend into sub-prefixes
    #[arg(short, long)]
    recursive: bool,
}

impl RenameArgs {
    fn to_request(&self) -> Result<RenameRequest> {
        RenameRequest::new(&self.prefix, &self.from, &self.to, self.recursive)
            .context("Invalid rename request")
    }
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let storage_backend = match self.storage_backend.as_str() {
            "memory" => StorageBackend::InMemory {
                bucket: self.bucket.clone().unwrap_or_else(|| "local".to_string()),
            },
            "s3" => StorageBackend::S3 {
                bucket: self
                    .bucket
                    .clone()
                    .context("S3_BUCKET is required for S3 backend")?,
                region: self.s3_region.clone(),
                access_key: self.s3_access_key.clone(),
                secret_key: self.s3_secret_key.clone(),
                session_token: self.s3_session_token.clone(),
                endpoint: self.s3_endpoint.clone(),
            },
            "minio" => StorageBackend::MinIO {
                endpoint: self
                    .s3_endpoint
                    .clone()
                    .context("S3_ENDPOINT is required for MinIO backend")?,
                bucket: self
                    .bucket
                    .clone()
                    .context("S3_BUCKET is required for MinIO backend")?,
                access_key: self
                    .s3_access_key
                    .clone()
                    .context("S3_ACCESS_KEY is required for MinIO backend")?,
                secret_key: self
                    .s3_secret_key
                    .clone()
                    .context("S3_SECRET_KEY is required for MinIO backend")?,
                use_ssl: self.minio_use_ssl,
            },
            _ => bail!("Unknown storage backend: {}", self.storage_backend),
        };

        Ok(AppConfig {
            storage_backend,
            settings: EngineSettings::builder()
                .concurrency(self.concurrency)
                .request_timeout(Duration::from_secs(self.request_timeout_secs))
                .build(),
        })
    }

    fn init_logging(&self) {
        let env_filter =
            EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

        // stdout carries command output
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            let text = serde_json::to_string_pretty(value).context("Failed to encode output")?;
            println!("{}", text);
        } else {
            println!("{}", human(value));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging();

    let config = cli.to_app_config()?;
    info!(backend = cli.storage_backend.as_str(), "starting");

    let app = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    run(&cli, &app).await
}

async fn run(cli: &Cli, app: &AppServices) -> Result<ExitCode> {
    let session = &app.session;

    match &cli.command {
        Commands::TestConnection => {
            app.rename_service
                .test_connection(session)
                .await
                .with_context(|| format!("Cannot reach bucket {}", session.bucket()))?;
            println!("Connected to bucket {}", session.bucket());
        }

        Commands::Browse { prefix } => {
            let prefix = Prefix::new(prefix).context("Invalid prefix")?;
            let listing = app.rename_service.browse(session, &prefix).await?;
            cli.emit(&listing, |listing| {
                let mut lines = Vec::new();
                for folder in &listing.folders {
                    lines.push(format!("{}/", folder.name));
                }
                for file in &listing.files {
                    lines.push(format!("{}  ({} bytes)", file.name, file.size));
                }
                lines.join("\n")
            })?;
        }

        Commands::Plan { rename } => {
            let request = rename.to_request()?;
            let preview = app
                .rename_service
                .preview(session, &request, &CancellationToken::new())
                .await?;
            cli.emit(&preview, |preview| {
                let mut lines: Vec<String> = preview
                    .plan
                    .entries()
                    .iter()
                    .map(|e| format!("{} -> {}", e.source_key(), e.destination_key()))
                    .collect();
                lines.push(format!(
                    "{} listed, {} matched, {} planned, {} excluded",
                    preview.listed,
                    preview.matched,
                    preview.plan.len(),
                    preview.plan.excluded.len()
                ));
                lines.join("\n")
            })?;
        }

        Commands::Apply {
            rename,
            select,
            all,
            delete_original,
            allow_root,
        } => {
            let request = rename.to_request()?;
            if *delete_original && !*allow_root {
                Prefix::non_empty(&rename.prefix)
                    .context("Refusing to delete originals across the whole bucket without --allow-root")?;
            }
            if !*all && select.is_empty() {
                bail!("Nothing selected: pass --all or one or more --select keys");
            }

            let cancel = CancellationToken::new();
            let preview = app
                .rename_service
                .preview(session, &request, &cancel)
                .await?;
            let mut plan = preview.plan;

            if *all {
                plan.select_all();
            } else {
                let found = plan.select_sources(select.iter().map(String::as_str));
                if found < select.len() {
                    warn!(
                        requested = select.len(),
                        found, "some selected keys are not in the plan"
                    );
                }
            }

            let watcher = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, finishing in-flight renames");
                    watcher.cancel();
                }
            });

            let result = app
                .rename_service
                .apply(session, &mut plan, !*delete_original, &cancel)
                .await;
            cli.emit(&result, |result| {
                let mut lines: Vec<String> = result
                    .outcomes
                    .iter()
                    .filter(|o| !o.is_applied() || o.has_delete_warning())
                    .map(|o| {
                        format!(
                            "{}: {}",
                            o.source_key,
                            o.message.as_deref().unwrap_or("failed")
                        )
                    })
                    .collect();
                lines.push(result.summary());
                lines.join("\n")
            })?;

            if !result.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Verify {
            key,
            expected,
            kind,
        } => {
            let request = VerificationRequest::builder()
                .key(ObjectKey::new(key.as_str()).context("Invalid object key")?)
                .expected_fingerprint(expected.as_str())
                .kind(kind.parse::<FingerprintKind>()?)
                .build();
            let result = app.verification_service.verify(session, &request).await;
            cli.emit(&result, |result| match (&result.error_kind, &result.message) {
                (Some(kind), Some(message)) => format!("{}: {} ({})", result.key, message, kind),
                _ if result.matched => format!("{}: match", result.key),
                _ => format!(
                    "{}: mismatch, actual {}",
                    result.key,
                    result.actual_fingerprint.as_deref().unwrap_or("-")
                ),
            })?;

            if !result.matched {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Upload { key, file } => {
            let key = ObjectKey::new(key.as_str()).context("Invalid object key")?;
            let data = tokio::fs::read(file)
                .await
                .with_context(|| format!("Failed to read {}", file))?;
            let descriptor = session
                .store()
                .put_object(&key, Bytes::from(data))
                .await?;
            cli.emit(&descriptor, |d| {
                format!(
                    "Uploaded {} ({} bytes, etag {})",
                    d.key,
                    d.size,
                    d.etag.as_deref().unwrap_or("-")
                )
            })?;
        }

        Commands::Presign {
            key,
            method,
            ttl_secs,
        } => {
            let key = ObjectKey::new(key.as_str()).context("Invalid object key")?;
            let method: LinkMethod = method.parse()?;
            let link = app
                .link_service
                .generate(session, &key, method, Duration::from_secs(*ttl_secs))
                .await?;
            cli.emit(&link, |link| {
                format!("{}\nexpires at {}", link.url, link.expires_at.to_rfc3339())
            })?;
        }

        Commands::ParseLink { link } => {
            let descriptor = app.link_service.parse(link)?;
            let now = chrono::Utc::now();
            cli.emit(&descriptor, |d| {
                format!(
                    "bucket: {}\nkey: {}\nmethod: {}\nexpires: {}{}\nsignature: {}",
                    d.bucket,
                    d.key,
                    d.method,
                    d.expires_at.to_rfc3339(),
                    if d.is_expired(now) { " (expired)" } else { "" },
                    if d.is_valid_signature_present {
                        "present"
                    } else {
                        "missing"
                    }
                )
            })?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
