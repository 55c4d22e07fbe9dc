//! Client SDK for the imobiliária REST API.
//!
//! # Overview
//! Maintains one authenticated session (login, durable tokens,
//! transparent one-shot refresh on 401) and the domain state a frontend
//! consumes: the listing catalog with typed search filters and
//! pagination, the lead pipeline, visit scheduling and the site
//! configuration.
//!
//! # Design
//! - `ApiClient` is an explicit context object created at application
//!   start and cloned into each store — no ambient singletons.
//! - Stores own their state exclusively and mutate it only from the
//!   completion of their own requests; callers read through cloning
//!   accessors.
//! - Network failures stop at the store boundary: logged, surfaced
//!   through the [`Notifier`] seam, and converted to sentinels — except
//!   where the documented contract rethrows so multi-step flows can
//!   abort.
//! - DTOs mirror the backend's wire schema and are defined independently
//!   from the mock-server crate; integration tests catch schema drift.

pub mod admin;
pub mod config;
pub mod error;
pub mod filters;
pub mod http;
pub mod leads;
pub mod listings;
pub mod notify;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;

pub use admin::AdminStore;
pub use config::ApiConfig;
pub use error::ApiError;
pub use filters::{FilterPatch, ListingFilters};
pub use http::{ApiClient, SessionState};
pub use leads::LeadStore;
pub use listings::ListingStore;
pub use notify::{LogNotifier, NoticeLevel, Notifier, RecordingNotifier};
pub use session::{OpOutcome, SessionStore};
pub use storage::{FileTokenStorage, MemoryTokenStorage, StoredTokens, TokenStorage};
pub use token::AccessClaims;
pub use types::{
    ContatoForm, DashboardStats, Imovel, ImovelImagem, ImovelInput, Lead, LeadStatus, Page,
    Pagination, ProfileUpdate, RegisterData, SiteConfig, TipoImovel, TipoNegocio, UserProfile,
    Visita, VisitaStatus,
};
