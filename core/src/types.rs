//! Domain DTOs for the imobiliária API.
//!
//! # Design
//! These types mirror the backend's wire schema (pt-BR field names) but
//! are defined independently from the mock-server crate; the integration
//! tests catch schema drift. Closed vocabularies (property type, deal
//! type, lead and visit status) are enums with explicit serde renames so
//! an unexpected wire value is a deserialization error, not a silent
//! string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoImovel {
    Casa,
    Apartamento,
    Terreno,
    Comercial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoNegocio {
    Venda,
    Aluguel,
}

/// A property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imovel {
    pub id: i64,
    pub titulo: String,
    pub descricao: String,
    pub tipo_imovel: TipoImovel,
    pub tipo_negocio: TipoNegocio,
    pub preco_venda: Option<f64>,
    pub valor_aluguel: Option<f64>,
    pub preco: f64,
    pub area_total: f64,
    pub area_construida: Option<f64>,
    pub quartos: u32,
    pub banheiros: u32,
    pub vagas_garagem: u32,
    pub rua: String,
    pub numero: String,
    pub complemento: Option<String>,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    pub cep: String,
    pub piscina: bool,
    pub aceita_pets: bool,
    pub mobiliado: bool,
    pub destaque: bool,
    pub imagem_principal: Option<String>,
    pub imagens: Option<Vec<ImovelImagem>>,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImovelImagem {
    pub id: i64,
    pub imagem_url: String,
    pub ordem: u32,
    pub principal: bool,
}

/// Create/update payload for a listing. Only the fields present in the
/// JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImovelInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_imovel: Option<TipoImovel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_negocio: Option<TipoNegocio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preco_venda: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_aluguel: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preco: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_construida: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quartos: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banheiros: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vagas_garagem: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rua: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complemento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bairro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piscina: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aceita_pets: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobiliado: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destaque: Option<bool>,
}

/// One page of a paginated collection, as the server returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// The pagination cursor kept by the listing store, replaced atomically
/// on each fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    #[serde(rename = "novo")]
    Novo,
    #[serde(rename = "contatado")]
    Contatado,
    #[serde(rename = "visitaAgendada")]
    VisitaAgendada,
    #[serde(rename = "negociacao")]
    Negociacao,
    #[serde(rename = "convertido")]
    Convertido,
    #[serde(rename = "perdido")]
    Perdido,
}

impl LeadStatus {
    /// The wire spelling, used for query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Novo => "novo",
            LeadStatus::Contatado => "contatado",
            LeadStatus::VisitaAgendada => "visitaAgendada",
            LeadStatus::Negociacao => "negociacao",
            LeadStatus::Convertido => "convertido",
            LeadStatus::Perdido => "perdido",
        }
    }
}

/// A contact/inquiry record tracked through the sales pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub mensagem: Option<String>,
    pub status: LeadStatus,
    pub origem: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Public contact form, captured as a new lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContatoForm {
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub mensagem: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitaStatus {
    Agendada,
    Confirmada,
    Realizada,
    Cancelada,
}

/// A scheduled property visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visita {
    pub id: i64,
    pub imovel_id: i64,
    pub lead_id: Option<i64>,
    pub nome_cliente: String,
    pub email_cliente: String,
    pub telefone_cliente: String,
    pub data_hora: DateTime<Utc>,
    pub status: VisitaStatus,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Company configuration shown across the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub nome_empresa: String,
    pub email: String,
    pub telefone: String,
    pub whatsapp: String,
    pub endereco: String,
    pub site: Option<String>,
    pub sobre: Option<String>,
    pub notificacao_email: bool,
    pub notificacao_sms: bool,
    pub notificacao_whatsapp: bool,
}

impl Default for SiteConfig {
    /// The product defaults, used until a configuration is saved.
    fn default() -> Self {
        Self {
            nome_empresa: "ImobiLux".to_string(),
            email: "contato@imobilux.com.br".to_string(),
            telefone: "(11) 1234-5678".to_string(),
            whatsapp: "(11) 91234-5678".to_string(),
            endereco: "Rua Exemplo, 123 - São Paulo, SP".to_string(),
            site: Some("www.imobilux.com.br".to_string()),
            sobre: Some(
                "Encontre o lar dos seus sonhos com a melhor imobiliária da região.".to_string(),
            ),
            notificacao_email: true,
            notificacao_sms: false,
            notificacao_whatsapp: true,
        }
    }
}

/// Back-office dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_imoveis: u64,
    pub total_leads: u64,
    pub visitas_agendadas: u64,
    pub conversoes: u64,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial profile update; omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}
