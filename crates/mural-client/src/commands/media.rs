//! Admin media: the single featured video, the image gallery and the
//! full-size image overlay.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use mural_shared::files::FileUpload;
use mural_shared::models::{GalleryItem, MediaRecord};
use mural_shared::paths;
use mural_shared::types::RecordKey;
use mural_store::{BackendError, Snapshot};

use crate::context::AppContext;
use crate::error::ClientError;
use crate::events::{GalleryTile, GalleryView};

/// Outcome of a multi-image upload. Uploads stop at the first failure;
/// files before it stay uploaded.
#[derive(Debug, Default)]
pub struct ImageUploadReport {
    pub uploaded: Vec<GalleryItem>,
    pub failed: Option<FailedUpload>,
}

impl ImageUploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

#[derive(Debug)]
pub struct FailedUpload {
    pub file_name: String,
    pub error: ClientError,
}

pub struct MediaAdmin {
    ctx: Arc<AppContext>,
    // last gallery prefix handed out, in epoch millis
    last_prefix: AtomicI64,
}

impl MediaAdmin {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            last_prefix: AtomicI64::new(0),
        }
    }

    /// Millisecond prefix that never repeats within this process, even when
    /// two files land in the same millisecond.
    fn next_prefix(&self) -> i64 {
        let now = self.ctx.clock.now().timestamp_millis();
        let mut prev = self.last_prefix.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last_prefix
                .compare_exchange(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    fn media_record(&self, url: String, uploaded_by: &str) -> MediaRecord {
        MediaRecord {
            url,
            uploaded_by: uploaded_by.to_string(),
            uploaded_at: self.ctx.clock.now(),
        }
    }

    // -- Video --------------------------------------------------------------

    pub async fn upload_video(&self, files: &[FileUpload]) -> Result<MediaRecord, ClientError> {
        let result = self.try_upload_video(files).await;
        let record = self.ctx.reported("Erro ao fazer upload do vídeo", result)?;
        self.ctx.notifier.success("Vídeo atualizado com sucesso!");
        self.ctx.view.render_video(Some(&record));
        Ok(record)
    }

    async fn try_upload_video(&self, files: &[FileUpload]) -> Result<MediaRecord, ClientError> {
        let admin = self
            .ctx
            .require_admin("Apenas administradores podem fazer upload de vídeos!")?;
        let file = match files {
            [] => return Err(ClientError::validation("Por favor, selecione um vídeo!")),
            [file] => file,
            _ => {
                return Err(ClientError::validation(
                    "Por favor, selecione apenas um vídeo!",
                ))
            }
        };

        self.ctx.notifier.info("Uploading vídeo... Aguarde.");
        let blob = paths::video_blob();
        self.ctx
            .backend
            .blobs
            .put(&blob, file.bytes.clone(), file.content_type.as_deref())
            .await?;
        let url = self.ctx.backend.blobs.public_url(&blob).await?;

        let record = self.media_record(url, &admin.user.email);
        let value = serde_json::to_value(&record).map_err(BackendError::from)?;
        self.ctx.backend.data.set(&paths::video_record(), value).await?;

        info!(size = file.len(), "video replaced");
        Ok(record)
    }

    // -- Gallery ------------------------------------------------------------

    pub async fn upload_images(&self, files: &[FileUpload]) -> Result<ImageUploadReport, ClientError> {
        let admin = self
            .ctx
            .require_admin("Apenas administradores podem fazer upload de imagens!")
            .and_then(|admin| {
                if files.is_empty() {
                    Err(ClientError::validation(
                        "Por favor, selecione pelo menos uma imagem!",
                    ))
                } else {
                    Ok(admin)
                }
            });
        let admin = self.ctx.reported("Erro ao fazer upload das imagens", admin)?;

        self.ctx.notifier.info("Uploading imagens... Aguarde.");
        let mut report = ImageUploadReport::default();
        for file in files {
            match self.upload_image(file, &admin.user.email).await {
                Ok(item) => report.uploaded.push(item),
                Err(error) => {
                    warn!(file = %file.name, uploaded = report.uploaded.len(), "image upload stopped");
                    self.ctx.report("Erro ao fazer upload das imagens", &error);
                    report.failed = Some(FailedUpload {
                        file_name: file.name.clone(),
                        error,
                    });
                    return Ok(report);
                }
            }
        }

        info!(count = report.uploaded.len(), "images added to gallery");
        self.ctx.notifier.success("Imagens adicionadas com sucesso!");
        self.ctx.view.clear_image_selection();
        Ok(report)
    }

    async fn upload_image(&self, file: &FileUpload, uploaded_by: &str) -> Result<GalleryItem, ClientError> {
        let blob = paths::gallery_blob(self.next_prefix(), &file.blob_safe_name())?;
        self.ctx
            .backend
            .blobs
            .put(&blob, file.bytes.clone(), file.content_type.as_deref())
            .await?;
        let url = self.ctx.backend.blobs.public_url(&blob).await?;

        let record = self.media_record(url, uploaded_by);
        let path = self.ctx.backend.data.push(&paths::gallery())?;
        let value = serde_json::to_value(&record).map_err(BackendError::from)?;
        self.ctx.backend.data.set(&path, value).await?;

        debug!(blob = %blob, key = path.key(), "image stored");
        Ok(GalleryItem {
            id: RecordKey::from(path.key()),
            record,
        })
    }

    // -- Overlay ------------------------------------------------------------

    pub fn open_image(&self, url: &str) {
        self.ctx.view.show_image_overlay(Some(url));
    }

    pub fn close_image(&self) {
        self.ctx.view.show_image_overlay(None);
    }

    // -- Feeds --------------------------------------------------------------

    pub async fn run_video_feed(self: Arc<Self>) {
        let mut feed = self.ctx.backend.data.subscribe(&paths::video_record());
        while let Some(snapshot) = feed.recv().await {
            let record = match snapshot.decode::<MediaRecord>() {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "malformed video record");
                    None
                }
            };
            self.ctx.view.render_video(record.as_ref());
        }
        debug!("video feed stopped");
    }

    pub async fn run_gallery_feed(self: Arc<Self>) {
        let mut feed = self.ctx.backend.data.subscribe(&paths::gallery());
        while let Some(snapshot) = feed.recv().await {
            let items = decode_gallery(&snapshot);
            let view = if items.is_empty() {
                GalleryView::Empty
            } else {
                GalleryView::Tiles(items.iter().map(GalleryTile::from).collect())
            };
            self.ctx.view.render_gallery(&view);
        }
        debug!("gallery feed stopped");
    }
}

/// Gallery entries in key order, which is upload order.
pub fn decode_gallery(snapshot: &Snapshot) -> Vec<GalleryItem> {
    snapshot
        .children()
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<MediaRecord>(value.clone()) {
            Ok(record) => Some(GalleryItem { id, record }),
            Err(e) => {
                warn!(key = %id, error = %e, "skipping malformed gallery entry");
                None
            }
        })
        .collect()
}
