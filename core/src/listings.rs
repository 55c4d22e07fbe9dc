//! Listing catalog store.
//!
//! # Design
//! Single source of truth for the loaded listing collection, the active
//! filter set and the pagination cursor. Collections are replaced
//! wholesale on each fetch — there is no partial patching of a listing.
//! Network failures stop here: they are logged, converted into a user
//! notice, and either swallowed (fetches, `remove`) or rethrown after
//! notifying (`create`/`update`/`upload_imagem`/`toggle_destaque`) so a
//! multi-step flow can abort.
//!
//! Concurrent fetches are guarded by a sequence ticket: every
//! `fetch_imoveis` call takes the next ticket and its response is applied
//! only while it is still the newest issued call, so a slow page-1
//! response can never overwrite a faster page-2 response that was
//! requested later. The stale response is dropped, not cancelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, error, warn};

use crate::error::ApiError;
use crate::filters::{FilterPatch, ListingFilters};
use crate::http::ApiClient;
use crate::notify::{NoticeLevel, Notifier};
use crate::types::{Imovel, ImovelImagem, ImovelInput, Page, Pagination};

#[derive(Default)]
struct ListingState {
    imoveis: Vec<Imovel>,
    imovel: Option<Imovel>,
    destaques: Vec<Imovel>,
    filtros: ListingFilters,
    pagination: Pagination,
}

pub struct ListingStore {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    state: RwLock<ListingState>,
    fetch_seq: AtomicU64,
}

impl ListingStore {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            state: RwLock::new(ListingState::default()),
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// Fetch one page of the catalog. `patch`, when given, is merged over
    /// the persisted filters for this request only — the stored filter
    /// set is not mutated. On success the collection and the pagination
    /// cursor are replaced wholesale; on failure the prior state is left
    /// untouched and the user is notified.
    pub async fn fetch_imoveis(&self, page: u32, patch: Option<&FilterPatch>) {
        let ticket = self.begin_fetch();
        let filtros = self.filtros();
        let effective = match patch {
            Some(patch) => patch.merged_over(&filtros),
            None => filtros,
        };

        let mut query = vec![("page", page.to_string())];
        query.extend(effective.to_query());

        let url = self.client.url("/api/imoveis/");
        let result: Result<Page<Imovel>, ApiError> = self
            .client
            .request_json(|http| http.get(url.as_str()).query(&query))
            .await;

        match result {
            Ok(page_data) => {
                if !self.apply_fetch(ticket, page_data) {
                    debug!(ticket, "dropped stale listing response");
                }
            }
            Err(e) => {
                error!(error = %e, page, "listing fetch failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao carregar imóveis");
            }
        }
    }

    /// Fetch the featured listings. Any failure resets the list to empty
    /// rather than leaving stale data.
    pub async fn fetch_destaques(&self) {
        let url = self.client.url("/api/imoveis/destaques/");
        let result: Result<Vec<Imovel>, ApiError> = self
            .client
            .request_json(|http| http.get(url.as_str()))
            .await;

        let mut state = self.state.write().unwrap();
        match result {
            Ok(destaques) => state.destaques = destaques,
            Err(e) => {
                warn!(error = %e, "featured fetch failed, clearing the list");
                state.destaques.clear();
            }
        }
    }

    /// Fetch a single listing, keeping it as the current detail record.
    pub async fn fetch_imovel(&self, id: i64) -> Option<Imovel> {
        let url = self.client.url(&format!("/api/imoveis/{id}/"));
        let result: Result<Imovel, ApiError> = self
            .client
            .request_json(|http| http.get(url.as_str()))
            .await;

        match result {
            Ok(imovel) => {
                self.state.write().unwrap().imovel = Some(imovel.clone());
                Some(imovel)
            }
            Err(e) => {
                error!(error = %e, id, "listing detail fetch failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao carregar detalhes do imóvel");
                None
            }
        }
    }

    pub async fn create(&self, input: &ImovelInput) -> Result<Imovel, ApiError> {
        let url = self.client.url("/api/imoveis/");
        match self
            .client
            .request_json(|http| http.post(url.as_str()).json(input))
            .await
        {
            Ok(imovel) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Imóvel criado com sucesso!");
                Ok(imovel)
            }
            Err(e) => {
                error!(error = %e, "listing create failed");
                self.notifier.notify(NoticeLevel::Error, "Erro ao criar imóvel");
                Err(e)
            }
        }
    }

    pub async fn update(&self, id: i64, input: &ImovelInput) -> Result<Imovel, ApiError> {
        let url = self.client.url(&format!("/api/imoveis/{id}/"));
        match self
            .client
            .request_json(|http| http.put(url.as_str()).json(input))
            .await
        {
            Ok(imovel) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Imóvel atualizado com sucesso!");
                Ok(imovel)
            }
            Err(e) => {
                error!(error = %e, id, "listing update failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao atualizar imóvel");
                Err(e)
            }
        }
    }

    /// Delete a listing. Returns whether it succeeded; never errors.
    pub async fn remove(&self, id: i64) -> bool {
        let url = self.client.url(&format!("/api/imoveis/{id}/"));
        match self
            .client
            .request_unit(|http| http.delete(url.as_str()))
            .await
        {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Imóvel deletado com sucesso!");
                true
            }
            Err(e) => {
                error!(error = %e, id, "listing delete failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao deletar imóvel");
                false
            }
        }
    }

    /// Upload one image for a listing. The bytes are owned so the replay
    /// after a token refresh can rebuild the multipart form.
    pub async fn upload_imagem(
        &self,
        imovel_id: i64,
        imagem: Vec<u8>,
        filename: &str,
        ordem: u32,
        principal: bool,
    ) -> Result<ImovelImagem, ApiError> {
        let url = self.client.url(&format!("/api/imoveis/{imovel_id}/upload_imagem/"));
        let result = self
            .client
            .request_json(|http| {
                let part = reqwest::multipart::Part::bytes(imagem.clone())
                    .file_name(filename.to_string());
                let form = reqwest::multipart::Form::new()
                    .part("imagem", part)
                    .text("ordem", ordem.to_string())
                    .text("principal", principal.to_string());
                http.post(url.as_str()).multipart(form)
            })
            .await;

        match result {
            Ok(imagem) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Imagem enviada com sucesso!");
                Ok(imagem)
            }
            Err(e) => {
                error!(error = %e, imovel_id, "image upload failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao enviar imagem");
                Err(e)
            }
        }
    }

    /// Flip the featured flag server-side, returning the updated listing.
    pub async fn toggle_destaque(&self, id: i64) -> Result<Imovel, ApiError> {
        let url = self.client.url(&format!("/api/imoveis/{id}/toggle_destaque/"));
        match self
            .client
            .request_json::<Imovel, _>(|http| http.patch(url.as_str()))
            .await
        {
            Ok(imovel) => {
                let message = if imovel.destaque {
                    "Imóvel destacado com sucesso!"
                } else {
                    "Destaque removido com sucesso!"
                };
                self.notifier.notify(NoticeLevel::Success, message);
                Ok(imovel)
            }
            Err(e) => {
                error!(error = %e, id, "featured toggle failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao alternar destaque do imóvel");
                Err(e)
            }
        }
    }

    /// Shallow-merge a patch into the persisted filters.
    pub fn update_filtros(&self, patch: &FilterPatch) {
        patch.apply(&mut self.state.write().unwrap().filtros);
    }

    /// Reset the filters to their documented defaults.
    pub fn limpar_filtros(&self) {
        self.state.write().unwrap().filtros = ListingFilters::default();
    }

    pub fn imoveis(&self) -> Vec<Imovel> {
        self.state.read().unwrap().imoveis.clone()
    }

    pub fn destaques(&self) -> Vec<Imovel> {
        self.state.read().unwrap().destaques.clone()
    }

    pub fn imovel_atual(&self) -> Option<Imovel> {
        self.state.read().unwrap().imovel.clone()
    }

    pub fn filtros(&self) -> ListingFilters {
        self.state.read().unwrap().filtros.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.read().unwrap().pagination.clone()
    }

    fn begin_fetch(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a fetched page if `ticket` still belongs to the newest
    /// issued fetch. Returns whether the page was applied.
    fn apply_fetch(&self, ticket: u64, page: Page<Imovel>) -> bool {
        let mut state = self.state.write().unwrap();
        if self.fetch_seq.load(Ordering::SeqCst) != ticket {
            return false;
        }
        state.pagination = Pagination {
            count: page.count,
            next: page.next,
            previous: page.previous,
        };
        state.imoveis = page.results;
        true
    }
}
