//! Star-rated reviews: the rating selector, submission, the live list and
//! admin deletion.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use mural_shared::constants::MAX_RATING;
use mural_shared::models::{sort_newest_first, AuthorSnapshot, Review, StoredReview};
use mural_shared::paths;
use mural_shared::types::{Rating, RecordKey};
use mural_store::{BackendError, Snapshot};

use crate::context::AppContext;
use crate::error::ClientError;
use crate::events::{AuthPanel, ReviewCard, ReviewList};
use crate::state::Session;

/// Star selector. 0 means nothing selected; hovering previews a value
/// without selecting it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingSelector {
    selected: u8,
    hovered: Option<u8>,
}

impl RatingSelector {
    pub fn select(&mut self, stars: u8) {
        if stars <= MAX_RATING {
            self.selected = stars;
        }
    }

    pub fn hover(&mut self, stars: u8) {
        if stars <= MAX_RATING {
            self.hovered = Some(stars);
        }
    }

    pub fn leave(&mut self) {
        self.hovered = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn selected(&self) -> u8 {
        self.selected
    }

    /// Stars to highlight right now.
    pub fn displayed(&self) -> u8 {
        self.hovered.unwrap_or(self.selected)
    }
}

pub struct ReviewBoard {
    ctx: Arc<AppContext>,
    rating: Mutex<RatingSelector>,
}

impl ReviewBoard {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            rating: Mutex::new(RatingSelector::default()),
        }
    }

    fn with_rating<T>(&self, f: impl FnOnce(&mut RatingSelector) -> T) -> T {
        let mut rating = self.rating.lock().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut rating);
        self.ctx.view.render_rating(rating.displayed());
        out
    }

    pub fn select_rating(&self, stars: u8) {
        self.with_rating(|r| r.select(stars));
    }

    pub fn hover_rating(&self, stars: u8) {
        self.with_rating(|r| r.hover(stars));
    }

    pub fn leave_rating(&self) {
        self.with_rating(|r| r.leave());
    }

    pub fn selected_rating(&self) -> u8 {
        self.rating.lock().unwrap_or_else(|e| e.into_inner()).selected()
    }

    // -- Submit -------------------------------------------------------------

    pub async fn submit(&self, text: &str) -> Result<RecordKey, ClientError> {
        if self.ctx.session.current().member().is_none() {
            self.ctx.view.show_auth_panel(Some(AuthPanel::Login));
        }
        let result = self.try_submit(text).await;
        let key = self.ctx.reported("Erro ao enviar avaliação", result)?;

        self.ctx.view.clear_review_form();
        self.with_rating(RatingSelector::clear);
        self.ctx.notifier.success("Avaliação enviada com sucesso!");
        Ok(key)
    }

    async fn try_submit(&self, text: &str) -> Result<RecordKey, ClientError> {
        let member = self
            .ctx
            .require_member("Você precisa estar logado para avaliar!")?;
        let rating = Rating::new(self.selected_rating())
            .map_err(|_| ClientError::validation("Por favor, selecione uma nota!"))?;
        if text.trim().is_empty() {
            return Err(ClientError::validation("Por favor, escreva sua opinião!"));
        }

        // fresh read so the snapshot reflects the profile as it is now
        let profile = self.ctx.fetch_profile(&member.user.uid).await?;
        let author = AuthorSnapshot::new(member.user.uid.clone(), &member.user.email, profile.as_ref());
        let review = Review::compose(author, rating, text, self.ctx.clock.now())?;

        let path = self.ctx.backend.data.push(&paths::reviews())?;
        let value = serde_json::to_value(&review).map_err(BackendError::from)?;
        self.ctx.backend.data.set(&path, value).await?;

        info!(key = path.key(), rating = rating.get(), "review submitted");
        Ok(RecordKey::from(path.key()))
    }

    // -- Delete -------------------------------------------------------------

    /// Admin only, after confirmation. `Ok(false)` when the user declined.
    pub async fn delete(&self, id: &RecordKey) -> Result<bool, ClientError> {
        let admin = self.ctx.require_admin("Apenas administradores podem excluir avaliações!");
        self.ctx.reported("Erro ao excluir avaliação", admin)?;

        if !self
            .ctx
            .view
            .confirm("Tem certeza que deseja excluir esta avaliação?")
            .await
        {
            return Ok(false);
        }

        let result = self.remove(id).await;
        self.ctx.reported("Erro ao excluir avaliação", result)?;
        self.ctx.notifier.success("Avaliação excluída com sucesso!");
        Ok(true)
    }

    async fn remove(&self, id: &RecordKey) -> Result<(), ClientError> {
        let path = paths::review(id)?;
        self.ctx.backend.data.remove(&path).await?;
        info!(key = %id, "review deleted");
        Ok(())
    }

    // -- Live list ----------------------------------------------------------

    /// Re-render on every change to the collection, and on every session
    /// change so delete buttons follow the current role.
    pub async fn run_feed(self: Arc<Self>) {
        let mut reviews = self.ctx.backend.data.subscribe(&paths::reviews());
        let mut session = self.ctx.session.subscribe();
        let mut latest: Vec<StoredReview> = Vec::new();

        loop {
            tokio::select! {
                snapshot = reviews.recv() => match snapshot {
                    Some(snapshot) => latest = decode_reviews(&snapshot),
                    None => break,
                },
                changed = session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            let current = session.borrow_and_update().clone();
            self.render(&latest, &current);
        }
        debug!("review feed stopped");
    }

    pub fn render(&self, reviews: &[StoredReview], session: &Session) {
        let list = if reviews.is_empty() {
            ReviewList::Empty
        } else {
            let can_delete = session.is_admin();
            ReviewList::Cards(
                reviews
                    .iter()
                    .map(|r| ReviewCard::new(r, can_delete))
                    .collect(),
            )
        };
        self.ctx.view.render_reviews(&list);
    }
}

/// Every well-formed child of the collection, newest first.
pub fn decode_reviews(snapshot: &Snapshot) -> Vec<StoredReview> {
    let mut reviews: Vec<StoredReview> = snapshot
        .children()
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<Review>(value.clone()) {
            Ok(review) => Some(StoredReview { id, review }),
            Err(e) => {
                warn!(key = %id, error = %e, "skipping malformed review");
                None
            }
        })
        .collect();
    sort_newest_first(&mut reviews);
    reviews
}
