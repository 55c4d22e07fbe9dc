//! Back-office store: visit scheduling, dashboard stats, site
//! configuration.
//!
//! Site configuration is special-cased: until something is saved the
//! server answers 404, and the store falls back to the product defaults
//! instead of surfacing an error.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::error;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::notify::{NoticeLevel, Notifier};
use crate::types::{DashboardStats, SiteConfig, Visita, VisitaStatus};

#[derive(Default)]
struct AdminState {
    visitas: Vec<Visita>,
}

pub struct AdminStore {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    state: RwLock<AdminState>,
}

impl AdminStore {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            state: RwLock::new(AdminState::default()),
        }
    }

    pub async fn fetch_visitas(&self) {
        let url = self.client.url("/api/admin/visitas/");
        let result: Result<Vec<Visita>, ApiError> = self
            .client
            .request_json(|http| http.get(url.as_str()))
            .await;

        match result {
            Ok(visitas) => self.state.write().unwrap().visitas = visitas,
            Err(e) => {
                error!(error = %e, "visit fetch failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao carregar visitas");
            }
        }
    }

    pub async fn update_visita_status(&self, id: i64, status: VisitaStatus) -> bool {
        #[derive(Serialize)]
        struct StatusUpdate {
            status: VisitaStatus,
        }

        let url = self.client.url(&format!("/api/admin/visitas/{id}/"));
        match self
            .client
            .request_unit(|http| http.put(url.as_str()).json(&StatusUpdate { status }))
            .await
        {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Status atualizado com sucesso!");
                self.fetch_visitas().await;
                true
            }
            Err(e) => {
                error!(error = %e, id, "visit status update failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao atualizar status");
                false
            }
        }
    }

    pub async fn remove_visita(&self, id: i64) -> bool {
        let url = self.client.url(&format!("/api/admin/visitas/{id}/"));
        match self
            .client
            .request_unit(|http| http.delete(url.as_str()))
            .await
        {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Visita excluída com sucesso!");
                self.fetch_visitas().await;
                true
            }
            Err(e) => {
                error!(error = %e, id, "visit delete failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao excluir visita");
                false
            }
        }
    }

    pub async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        let url = self.client.url("/api/admin/stats/");
        self.client
            .request_json(|http| http.get(url.as_str()))
            .await
            .map_err(|e| {
                error!(error = %e, "stats fetch failed");
                e
            })
    }

    /// Fetch the site configuration, falling back to the product
    /// defaults when nothing has been saved yet or the call fails.
    pub async fn fetch_config(&self) -> SiteConfig {
        let url = self.client.url("/api/admin/configuracoes/");
        let result: Result<SiteConfig, ApiError> = self
            .client
            .request_json(|http| http.get(url.as_str()))
            .await;

        match result {
            Ok(config) => config,
            Err(ApiError::NotFound) => SiteConfig::default(),
            Err(e) => {
                error!(error = %e, "site config fetch failed, using defaults");
                SiteConfig::default()
            }
        }
    }

    pub async fn update_config(&self, config: &SiteConfig) -> bool {
        let url = self.client.url("/api/admin/configuracoes/");
        match self
            .client
            .request_unit(|http| http.put(url.as_str()).json(config))
            .await
        {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Configurações salvas com sucesso!");
                true
            }
            Err(e) => {
                error!(error = %e, "site config update failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao salvar configurações");
                false
            }
        }
    }

    pub fn visitas(&self) -> Vec<Visita> {
        self.state.read().unwrap().visitas.clone()
    }
}
