//! Curseur de pagination générique sur une collection distante
//!
//! [`Paginator`] enveloppe une fonction « récupère une page » et expose une
//! séquence paresseuse, à parcours unique, de lots (`next_batch`) ou
//! d'éléments (`next_item`, `into_stream`).
//!
//! Le style de continuation (offset ou curseur `after`) est déduit une seule
//! fois, à partir de la première page qui porte un lien `next`. Les APIs qui
//! mélangent les deux styles ne sont pas supportées.
//!
//! La pagination s'arrête quand la page n'a pas de `next`, ou quand le lot
//! reçu est plus petit que la limite demandée : certains endpoints annoncent
//! une page suivante qui n'existe pas.

use crate::error::{Result, SpotifyError};
use crate::models::Page;
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::future::Future;
use tracing::debug;
use url::Url;

/// Taille de page maximale acceptée par l'API
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Paramètres d'une requête paginée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: Option<u32>,
    pub after: Option<String>,
}

impl PageRequest {
    /// Requête de la première page
    pub fn first(limit: u32) -> Self {
        Self {
            limit,
            offset: None,
            after: None,
        }
    }

    /// Paramètres de query-string correspondants
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.to_string())];
        if let Some(offset) = self.offset {
            params.push(("offset", offset.to_string()));
        }
        if let Some(after) = &self.after {
            params.push(("after", after.clone()));
        }
        params
    }
}

/// Style de continuation d'une collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStyle {
    Offset,
    Cursor,
}

impl PageStyle {
    /// Classe un lien `next`
    pub fn detect(next: &str) -> Self {
        if query_param(next, "after").is_some() {
            PageStyle::Cursor
        } else {
            PageStyle::Offset
        }
    }
}

/// Extrait (décodé) un paramètre de query d'un lien de continuation
///
/// Les liens relatifs sont acceptés.
fn query_param(token: &str, name: &str) -> Option<String> {
    let url = Url::parse(token).or_else(|_| {
        Url::parse("http://continuation.invalid/").and_then(|base| base.join(token))
    });
    url.ok()?
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Curseur paresseux et non redémarrable sur une collection paginée
pub struct Paginator<T, F> {
    fetcher: F,
    limit: u32,
    style: Option<PageStyle>,
    next: Option<String>,
    finished: bool,
    buffer: VecDeque<T>,
    pages: usize,
}

impl<T, F, Fut> Paginator<T, F>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    /// Crée un curseur avec la limite par défaut (50)
    pub fn new(fetcher: F) -> Self {
        Self::with_limit(fetcher, DEFAULT_PAGE_LIMIT)
    }

    /// Crée un curseur avec une taille de page fixe
    pub fn with_limit(fetcher: F, limit: u32) -> Self {
        Self {
            fetcher,
            limit: limit.max(1),
            style: None,
            next: None,
            finished: false,
            buffer: VecDeque::new(),
            pages: 0,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Style détecté, `None` tant qu'aucune page n'a porté de `next`
    pub fn style(&self) -> Option<PageStyle> {
        self.style
    }

    /// Nombre d'appels effectués à la fonction de récupération
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Vrai quand plus aucun élément ne sera produit
    pub fn is_finished(&self) -> bool {
        self.finished && self.buffer.is_empty()
    }

    fn request(&self) -> Result<PageRequest> {
        let mut request = PageRequest::first(self.limit);
        let Some(next) = &self.next else {
            return Ok(request);
        };

        match self.style {
            Some(PageStyle::Offset) => {
                let offset = query_param(next, "offset")
                    .and_then(|raw| raw.parse::<u32>().ok())
                    .ok_or_else(|| SpotifyError::MalformedContinuation(next.clone()))?;
                request.offset = Some(offset);
            }
            Some(PageStyle::Cursor) => {
                let after = query_param(next, "after")
                    .ok_or_else(|| SpotifyError::MalformedContinuation(next.clone()))?;
                request.after = Some(after);
            }
            None => {}
        }
        Ok(request)
    }

    async fn fetch_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.finished {
            return Ok(None);
        }

        let request = self.request();
        // Un échec laisse le curseur épuisé : il n'est pas redémarrable.
        self.finished = true;
        let request = request?;

        debug!(
            "Fetching page {} (limit={}, offset={:?}, after={:?})",
            self.pages + 1,
            request.limit,
            request.offset,
            request.after
        );
        let page = (self.fetcher)(request).await?;
        self.pages += 1;

        if let Some(next) = &page.next {
            if self.style.is_none() {
                let style = PageStyle::detect(next);
                debug!("Pagination style detected: {:?}", style);
                self.style = Some(style);
            }
        }

        let short = (page.items.len() as u64) < u64::from(self.limit);
        match page.next {
            Some(next) if !short => {
                self.next = Some(next);
                self.finished = false;
            }
            _ => self.next = None,
        }

        Ok(Some(page.items))
    }

    /// Retourne le lot suivant, `None` une fois la collection épuisée
    ///
    /// Les éléments déjà chargés mais pas encore consommés par
    /// [`next_item`](Self::next_item) sont rendus en premier.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<T>>> {
        if !self.buffer.is_empty() {
            return Ok(Some(self.buffer.drain(..).collect()));
        }
        self.fetch_page().await
    }

    /// Retourne l'élément suivant, `None` une fois la collection épuisée
    pub async fn next_item(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.fetch_page().await? {
                Some(items) => self.buffer.extend(items),
                None => return Ok(None),
            }
        }
    }

    /// Matérialise toute la collection
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(batch) = self.next_batch().await? {
            all.extend(batch);
        }
        Ok(all)
    }

    /// Vue élément par élément sous forme de `Stream`
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> {
        stream::try_unfold(self, |mut paginator| async move {
            Ok::<_, SpotifyError>(paginator
                .next_item()
                .await?
                .map(|item| (item, paginator)))
        })
    }

    /// Vue lot par lot sous forme de `Stream`
    pub fn into_batches(self) -> impl Stream<Item = Result<Vec<T>>> {
        stream::try_unfold(self, |mut paginator| async move {
            Ok::<_, SpotifyError>(paginator
                .next_batch()
                .await?
                .map(|batch| (batch, paginator)))
        })
    }
}
