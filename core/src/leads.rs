//! Lead pipeline store.
//!
//! Leads enter through the public contact form and move through the
//! pipeline (novo → contatado → visitaAgendada → negociacao →
//! convertido/perdido) in the back office. Mutations refetch the list on
//! success so the in-memory collection tracks the server.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::error;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::notify::{NoticeLevel, Notifier};
use crate::types::{ContatoForm, Lead, LeadStatus};

#[derive(Default)]
struct LeadState {
    leads: Vec<Lead>,
    status_filter: Option<LeadStatus>,
}

pub struct LeadStore {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    state: RwLock<LeadState>,
}

impl LeadStore {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            state: RwLock::new(LeadState::default()),
        }
    }

    /// Fetch the lead list, optionally narrowed to one pipeline status.
    /// The filter is remembered and reused by the refetch after a
    /// mutation.
    pub async fn fetch_leads(&self, status_filter: Option<LeadStatus>) {
        self.state.write().unwrap().status_filter = status_filter;
        self.refetch().await;
    }

    /// Move a lead to another pipeline status.
    pub async fn update_status(&self, id: i64, status: LeadStatus) -> bool {
        #[derive(Serialize)]
        struct StatusUpdate {
            status: LeadStatus,
        }

        let url = self.client.url(&format!("/api/leads/{id}/"));
        match self
            .client
            .request_unit(|http| http.put(url.as_str()).json(&StatusUpdate { status }))
            .await
        {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Status atualizado com sucesso!");
                self.refetch().await;
                true
            }
            Err(e) => {
                error!(error = %e, id, "lead status update failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao atualizar status");
                false
            }
        }
    }

    pub async fn remove(&self, id: i64) -> bool {
        let url = self.client.url(&format!("/api/leads/{id}/"));
        match self
            .client
            .request_unit(|http| http.delete(url.as_str()))
            .await
        {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Lead excluído com sucesso!");
                self.refetch().await;
                true
            }
            Err(e) => {
                error!(error = %e, id, "lead delete failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao excluir lead");
                false
            }
        }
    }

    /// Submit the public contact form, creating a new lead.
    pub async fn enviar_contato(&self, form: &ContatoForm) -> bool {
        #[derive(Serialize)]
        struct NovoContato<'a> {
            #[serde(flatten)]
            form: &'a ContatoForm,
            origem: &'static str,
        }

        let url = self.client.url("/api/leads/contatos/");
        let body = NovoContato {
            form,
            origem: "pagina_contato",
        };
        match self
            .client
            .request_unit(|http| http.post(url.as_str()).json(&body))
            .await
        {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Mensagem enviada com sucesso!");
                true
            }
            Err(e) => {
                error!(error = %e, "contact submission failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao enviar mensagem");
                false
            }
        }
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.state.read().unwrap().leads.clone()
    }

    pub fn status_filter(&self) -> Option<LeadStatus> {
        self.state.read().unwrap().status_filter
    }

    async fn refetch(&self) {
        let status_filter = self.status_filter();
        let url = self.client.url("/api/leads/");
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = status_filter {
            query.push(("status_filter", status.as_str().to_string()));
        }

        let result: Result<Vec<Lead>, ApiError> = self
            .client
            .request_json(|http| http.get(url.as_str()).query(&query))
            .await;

        match result {
            Ok(leads) => self.state.write().unwrap().leads = leads,
            Err(e) => {
                error!(error = %e, "lead fetch failed");
                self.notifier
                    .notify(NoticeLevel::Error, "Erro ao carregar leads");
            }
        }
    }
}
