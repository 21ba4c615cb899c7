use std::path::{Path, PathBuf};

use image::ImageFormat;
use serde::Serialize;
use ulid::Ulid;

const EXTENSIONS: [&str; 3] = ["png", "jpg", "webp"];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Blob {
    pub id: String,
    pub url: String,
}

/// Storage for event images.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, data: Vec<u8>, content_type: &str) -> eventhub_shared::Result<Blob>;

    async fn delete(&self, id: &str) -> eventhub_shared::Result<()>;

    /// Blob id behind `url`, only if this store issued it.
    fn blob_id<'a>(&self, url: &'a str) -> Option<&'a str>;
}

/// Extracts the blob id from `<base_url>/<ulid>.<ext>`. Any other host, path,
/// extension or non-canonical id yields `None`.
pub fn blob_id_from_url<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    let file = url
        .strip_prefix(base_url.trim_end_matches('/'))?
        .strip_prefix('/')?;
    let (id, ext) = file.split_once('.')?;

    let canonical = Ulid::from_string(id).is_ok_and(|ulid| ulid.to_string() == id);
    if !canonical || !EXTENSIONS.contains(&ext) {
        return None;
    }

    Some(id)
}

/// Keeps images as `<id>.<ext>` files in a directory served under
/// `public_base_url`.
pub struct LocalBlobStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub async fn new(
        dir: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> eventhub_shared::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        Ok(Self {
            dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn extension(content_type: &str, data: &[u8]) -> eventhub_shared::Result<&'static str> {
    let expected = match content_type {
        "image/png" => ImageFormat::Png,
        "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
        "image/webp" => ImageFormat::WebP,
        other => eventhub_shared::user!("Unsupported image type: {}", other),
    };

    let Ok(actual) = image::guess_format(data) else {
        eventhub_shared::user!("Invalid image data");
    };

    if actual != expected {
        eventhub_shared::user!("Image data does not match {}", content_type);
    }

    Ok(match actual {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        _ => "webp",
    })
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, data: Vec<u8>, content_type: &str) -> eventhub_shared::Result<Blob> {
        if data.is_empty() {
            eventhub_shared::user!("No file uploaded");
        }

        let ext = extension(content_type, &data)?;
        let id = Ulid::new().to_string();
        let file_name = format!("{id}.{ext}");

        tokio::fs::write(self.dir.join(&file_name), data).await?;
        tracing::debug!(%id, content_type, "stored image");

        Ok(Blob {
            url: format!("{}/{file_name}", self.public_base_url),
            id,
        })
    }

    async fn delete(&self, id: &str) -> eventhub_shared::Result<()> {
        if id.is_empty() || id.contains(['/', '\\', '.']) {
            eventhub_shared::user!("Invalid image id");
        }

        for ext in EXTENSIONS {
            match tokio::fs::remove_file(self.dir.join(format!("{id}.{ext}"))).await {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            }
        }

        eventhub_shared::not_found!("image {}", id)
    }

    fn blob_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        blob_id_from_url(&self.public_base_url, url)
    }
}
