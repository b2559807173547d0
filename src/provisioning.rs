//! Download code signing files from blob storage.
//!
//! Provisioning profiles and a signing certificate are stored as named
//! objects. [`ManualProvisioning`] fetches them into the directories Xcode
//! reads from, never overwriting an existing file.

use std::env;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::Span;

use crate::client::ApiSession;
use crate::error::{AppDistError, Result};

const PROFILE_FILE_NAME: &str = "profile.mobileprovision";
const CERTIFICATE_FILE_NAME: &str = "certificate.p12";

/// Storage holding signing files as named objects.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write the contents of `object_name` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be fetched or written.
    async fn save_to_file(&self, object_name: &str, destination: &Path) -> Result<()>;
}

/// Blob storage served over HTTP with bearer authentication.
///
/// Objects are fetched from `{base_url}/{object_name}`.
#[derive(Debug, Clone)]
pub struct HttpBlobStorage {
    session: ApiSession,
}

impl HttpBlobStorage {
    /// Create storage from `APPDIST_STORAGE_URL` and `APPDIST_STORAGE_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is missing.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("APPDIST_STORAGE_URL").map_err(|_| {
            AppDistError::ConfigMissing("APPDIST_STORAGE_URL environment variable not set".to_string())
        })?;
        let token = env::var("APPDIST_STORAGE_TOKEN").map_err(|_| {
            AppDistError::ConfigMissing(
                "APPDIST_STORAGE_TOKEN environment variable not set".to_string(),
            )
        })?;
        Self::new(&token, &base_url)
    }

    /// # Errors
    ///
    /// Returns an error if the token is empty or the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Ok(Self {
            session: ApiSession::new(token, base_url)?,
        })
    }
}

#[async_trait]
impl BlobStorage for HttpBlobStorage {
    async fn save_to_file(&self, object_name: &str, destination: &Path) -> Result<()> {
        let contents = self
            .session
            .download(&urlencoding::encode(object_name))
            .await?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, contents).await?;
        Ok(())
    }
}

/// Where downloaded signing files are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningDirectories {
    pub profiles: PathBuf,
    pub certificates: PathBuf,
}

impl ProvisioningDirectories {
    pub fn new(profiles: impl Into<PathBuf>, certificates: impl Into<PathBuf>) -> Self {
        Self {
            profiles: profiles.into(),
            certificates: certificates.into(),
        }
    }
}

impl Default for ProvisioningDirectories {
    /// `~/Library/MobileDevice/Provisioning Profiles` and
    /// `~/Library/MobileDevice/Certificates`.
    fn default() -> Self {
        let home = env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
        let mobile_device = home.join("Library").join("MobileDevice");
        Self::new(
            mobile_device.join("Provisioning Profiles"),
            mobile_device.join("Certificates"),
        )
    }
}

/// Paths of the files written by [`ManualProvisioning::fetch_signing_files`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningFiles {
    pub profiles: Vec<PathBuf>,
    pub certificate: PathBuf,
}

/// Fetches provisioning profiles and a certificate from blob storage.
#[derive(Debug)]
pub struct ManualProvisioning<S> {
    storage: S,
    directories: ProvisioningDirectories,
    span: Span,
}

impl<S: BlobStorage> ManualProvisioning<S> {
    pub fn new(storage: S, directories: ProvisioningDirectories) -> Self {
        Self {
            storage,
            directories,
            span: tracing::info_span!("manual_provisioning"),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn directories(&self) -> &ProvisioningDirectories {
        &self.directories
    }

    /// Download every profile and the certificate, plus the certificate
    /// password object when one is named.
    ///
    /// The password is saved next to the certificate as
    /// `{certificate path}.password`.
    ///
    /// # Errors
    ///
    /// Returns [`AppDistError::InvalidParameter`] before downloading
    /// anything if an object name is empty, otherwise any storage error.
    pub async fn fetch_signing_files(
        &self,
        profile_names: &[String],
        certificate_name: &str,
        certificate_password_name: Option<&str>,
    ) -> Result<SigningFiles> {
        if profile_names.is_empty() || profile_names.iter().any(|n| n.trim().is_empty()) {
            return Err(AppDistError::InvalidParameter(
                "Cannot fetch signing files: provisioning profile object name not given"
                    .to_string(),
            ));
        }
        if certificate_name.trim().is_empty() {
            return Err(AppDistError::InvalidParameter(
                "Cannot fetch signing files: certificate object name not given".to_string(),
            ));
        }

        let mut profiles = Vec::with_capacity(profile_names.len());
        for name in profile_names {
            profiles.push(self.download_profile(name).await?);
        }
        let certificate = self
            .download_certificate(certificate_name, certificate_password_name.filter(|n| !n.is_empty()))
            .await?;

        Ok(SigningFiles {
            profiles,
            certificate,
        })
    }

    async fn download_profile(&self, name: &str) -> Result<PathBuf> {
        self.span
            .in_scope(|| tracing::info!("Download provisioning profile {name}"));
        let path = unique_path(&self.directories.profiles, PROFILE_FILE_NAME).await?;
        self.save(name, &path).await?;
        self.span
            .in_scope(|| tracing::info!("Saved provisioning profile {name} to {}", path.display()));
        Ok(path)
    }

    async fn download_certificate(&self, name: &str, password_name: Option<&str>) -> Result<PathBuf> {
        self.span
            .in_scope(|| tracing::info!("Download certificate {name}"));
        let path = unique_path(&self.directories.certificates, CERTIFICATE_FILE_NAME).await?;
        self.save(name, &path).await?;

        if let Some(password_name) = password_name {
            let mut password_path = path.clone().into_os_string();
            password_path.push(".password");
            self.save(password_name, Path::new(&password_path)).await?;
        }
        self.span
            .in_scope(|| tracing::info!("Saved certificate {name} to {}", path.display()));
        Ok(path)
    }

    async fn save(&self, object_name: &str, destination: &Path) -> Result<()> {
        self.storage
            .save_to_file(object_name, destination)
            .await
            .inspect_err(|e| {
                self.span.in_scope(|| {
                    tracing::error!(error = %e, "Failed to download {object_name} from storage");
                });
            })
    }
}

/// First free path for `file_name` in `directory`: `name.ext`, then
/// `name_1.ext`, `name_2.ext` and so on. Creates `directory` if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or inspected.
pub async fn unique_path(directory: &Path, file_name: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(directory).await?;

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let mut candidate = directory.join(file_name);
    let mut counter = 1usize;
    while tokio::fs::try_exists(&candidate).await? {
        let name = match extension {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        candidate = directory.join(name);
        counter += 1;
    }
    Ok(candidate)
}
