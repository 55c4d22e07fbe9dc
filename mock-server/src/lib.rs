//! In-memory mock of the imobiliária REST API.
//!
//! # Design
//! Backs the SDK integration tests and doubles as a local development
//! server. State lives in `Arc<RwLock<...>>` collections; ids come from
//! a shared counter. DTOs are defined independently from the client
//! crate so schema drift is caught by the integration tests rather than
//! hidden by shared types.
//!
//! Auth mirrors the production backend: `POST /api/token/` issues an
//! HS256 access/refresh pair, protected routes demand a valid bearer
//! access token and answer 401 with a `detail` body otherwise. Token
//! lifetimes are knobs on [`AppState`] — a negative TTL issues
//! already-expired tokens, which is how the tests drive the client's
//! refresh protocol. Request counters expose how often the token,
//! refresh and protected endpoints were hit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const PAGE_SIZE: usize = 12;

type Rejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    (status, Json(json!({ "detail": message })))
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Imovel {
    pub id: i64,
    pub titulo: String,
    pub descricao: String,
    pub tipo_imovel: String,
    pub tipo_negocio: String,
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
    pub imagens: Vec<ImovelImagem>,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImovelImagem {
    pub id: i64,
    pub imagem_url: String,
    pub ordem: u32,
    pub principal: bool,
}

/// Create/update payload; only present fields are applied.
#[derive(Debug, Default, Deserialize)]
pub struct ImovelInput {
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub tipo_imovel: Option<String>,
    pub tipo_negocio: Option<String>,
    pub preco_venda: Option<f64>,
    pub valor_aluguel: Option<f64>,
    pub preco: Option<f64>,
    pub area_total: Option<f64>,
    pub area_construida: Option<f64>,
    pub quartos: Option<u32>,
    pub banheiros: Option<u32>,
    pub vagas_garagem: Option<u32>,
    pub rua: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub piscina: Option<bool>,
    pub aceita_pets: Option<bool>,
    pub mobiliado: Option<bool>,
    pub destaque: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub mensagem: Option<String>,
    pub status: String,
    pub origem: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Visita {
    pub id: i64,
    pub imovel_id: i64,
    pub lead_id: Option<i64>,
    pub nome_cliente: String,
    pub email_cliente: String,
    pub telefone_cliente: String,
    pub data_hora: DateTime<Utc>,
    pub status: String,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
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

#[derive(Clone, Debug)]
struct User {
    id: i64,
    username: String,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    exp: i64,
    user_id: i64,
    username: String,
    email: String,
    token_type: String,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Counters {
    pub token: AtomicUsize,
    pub refresh: AtomicUsize,
    pub protected: AtomicUsize,
}

pub struct AppState {
    secret: String,
    access_ttl: AtomicI64,
    refresh_ttl: AtomicI64,
    next_id: AtomicI64,
    users: RwLock<Vec<User>>,
    imoveis: RwLock<Vec<Imovel>>,
    leads: RwLock<Vec<Lead>>,
    visitas: RwLock<Vec<Visita>>,
    config: RwLock<Option<SiteConfig>>,
    pub counters: Counters,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            secret: "mock-server-secret".to_string(),
            access_ttl: AtomicI64::new(3600),
            refresh_ttl: AtomicI64::new(86400),
            next_id: AtomicI64::new(1),
            users: RwLock::new(Vec::new()),
            imoveis: RwLock::new(Vec::new()),
            leads: RwLock::new(Vec::new()),
            visitas: RwLock::new(Vec::new()),
            config: RwLock::new(None),
            counters: Counters::default(),
        }
    }

    /// Lifetime of newly issued access tokens. Negative values issue
    /// already-expired tokens.
    pub fn set_access_ttl(&self, secs: i64) {
        self.access_ttl.store(secs, Ordering::SeqCst);
    }

    pub fn set_refresh_ttl(&self, secs: i64) {
        self.refresh_ttl.store(secs, Ordering::SeqCst);
    }

    pub async fn seed_user(&self, username: &str, email: &str, password: &str) -> i64 {
        let id = self.alloc_id();
        self.users.write().await.push(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        });
        id
    }

    pub async fn seed_imoveis(&self, inputs: Vec<ImovelInput>) -> Vec<i64> {
        let mut ids = Vec::with_capacity(inputs.len());
        let mut imoveis = self.imoveis.write().await;
        for input in inputs {
            let imovel = build_imovel(self.alloc_id(), input);
            ids.push(imovel.id);
            imoveis.push(imovel);
        }
        ids
    }

    pub async fn seed_visita(&self, imovel_id: i64, nome_cliente: &str, status: &str) -> i64 {
        let id = self.alloc_id();
        self.visitas.write().await.push(Visita {
            id,
            imovel_id,
            lead_id: None,
            nome_cliente: nome_cliente.to_string(),
            email_cliente: format!("{}@example.com", nome_cliente.to_lowercase()),
            telefone_cliente: "(81) 99999-0000".to_string(),
            data_hora: Utc::now(),
            status: status.to_string(),
            observacoes: None,
            created_at: Utc::now(),
            updated_at: None,
        });
        id
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn issue_token(&self, user: &User, token_type: &str, ttl_secs: i64) -> String {
        let claims = Claims {
            exp: Utc::now().timestamp() + ttl_secs,
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            token_type: token_type.to_string(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("token encoding is infallible")
    }

    fn verify(&self, token: &str, expected_type: &str) -> Result<Claims, String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| "Token is invalid or expired".to_string())?;
        if data.claims.token_type != expected_type {
            return Err("Token has wrong type".to_string());
        }
        Ok(data.claims)
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn app() -> Router {
    app_with_state(Arc::new(AppState::new()))
}

pub fn app_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/token/", post(obtain_token))
        .route("/api/token/refresh/", post(refresh_token))
        .route("/api/register/", post(register))
        .route("/api/user/", get(get_user).put(update_user))
        .route("/api/change-password/", post(change_password))
        .route("/api/imoveis/", get(list_imoveis).post(create_imovel))
        .route("/api/imoveis/destaques/", get(list_destaques))
        .route(
            "/api/imoveis/{id}/",
            get(get_imovel).put(update_imovel).delete(delete_imovel),
        )
        .route("/api/imoveis/{id}/upload_imagem/", post(upload_imagem))
        .route("/api/imoveis/{id}/toggle_destaque/", patch(toggle_destaque))
        .route("/api/leads/", get(list_leads))
        .route("/api/leads/contatos/", post(create_contato))
        .route("/api/leads/{id}/", put(update_lead).delete(delete_lead))
        .route("/api/admin/visitas/", get(list_visitas))
        .route(
            "/api/admin/visitas/{id}/",
            put(update_visita).delete(delete_visita),
        )
        .route("/api/admin/stats/", get(stats))
        .route("/api/admin/configuracoes/", get(get_config).put(put_config))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<Claims, Rejection> {
    state.counters.protected.fetch_add(1, Ordering::SeqCst);
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    let Some(token) = token else {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "As credenciais de autenticação não foram fornecidas.",
        ));
    };
    state
        .verify(token, "access")
        .map_err(|m| reject(StatusCode::UNAUTHORIZED, &m))
}

// ---------------------------------------------------------------------------
// Auth handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn obtain_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, Rejection> {
    state.counters.token.fetch_add(1, Ordering::SeqCst);
    let users = state.users.read().await;
    let user = users
        .iter()
        .find(|u| u.username == body.username && u.password == body.password)
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "invalid credentials"))?;

    let access = state.issue_token(user, "access", state.access_ttl.load(Ordering::SeqCst));
    let refresh = state.issue_token(user, "refresh", state.refresh_ttl.load(Ordering::SeqCst));
    Ok(Json(json!({ "access": access, "refresh": refresh })))
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh: String,
}

async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<Value>, Rejection> {
    state.counters.refresh.fetch_add(1, Ordering::SeqCst);
    let claims = state
        .verify(&body.refresh, "refresh")
        .map_err(|m| reject(StatusCode::UNAUTHORIZED, &m))?;
    let users = state.users.read().await;
    let user = users
        .iter()
        .find(|u| u.id == claims.user_id)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Token is invalid or expired"))?;

    let access = state.issue_token(user, "access", state.access_ttl.load(Ordering::SeqCst));
    Ok(Json(json!({ "access": access })))
}

#[derive(Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

fn profile_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
    })
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    let mut users = state.users.write().await;
    if users.iter().any(|u| u.username == body.username) {
        return Err(reject(StatusCode::BAD_REQUEST, "Usuário já existe"));
    }
    let user = User {
        id: state.alloc_id(),
        username: body.username,
        email: body.email,
        password: body.password,
        first_name: String::new(),
        last_name: String::new(),
    };
    let profile = profile_json(&user);
    users.push(user);
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    let claims = require_auth(&state, &headers)?;
    let users = state.users.read().await;
    let user = users
        .iter()
        .find(|u| u.id == claims.user_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))?;
    Ok(Json(profile_json(user)))
}

#[derive(Deserialize)]
struct ProfileUpdate {
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<Value>, Rejection> {
    let claims = require_auth(&state, &headers)?;
    let mut users = state.users.write().await;
    let user = users
        .iter_mut()
        .find(|u| u.id == claims.user_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))?;
    if let Some(email) = body.email {
        user.email = email;
    }
    if let Some(first_name) = body.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = body.last_name {
        user.last_name = last_name;
    }
    Ok(Json(profile_json(user)))
}

#[derive(Deserialize)]
struct ChangePasswordRequest {
    old_password: String,
    new_password: String,
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, Rejection> {
    let claims = require_auth(&state, &headers)?;
    let mut users = state.users.write().await;
    let user = users
        .iter_mut()
        .find(|u| u.id == claims.user_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))?;
    if user.password != body.old_password {
        return Err(reject(StatusCode::BAD_REQUEST, "Senha atual incorreta"));
    }
    user.password = body.new_password;
    Ok(Json(json!({ "detail": "Senha alterada com sucesso" })))
}

// ---------------------------------------------------------------------------
// Listing handlers
// ---------------------------------------------------------------------------

fn matches_filters(imovel: &Imovel, params: &HashMap<String, String>) -> bool {
    for (key, value) in params {
        let ok = match key.as_str() {
            "page" | "ordering" => true,
            "tipo_negocio" => imovel.tipo_negocio == *value,
            "tipo_imovel" => imovel.tipo_imovel == *value,
            "cidade" => imovel.cidade.eq_ignore_ascii_case(value),
            "bairro" => imovel.bairro.eq_ignore_ascii_case(value),
            "quartos" => value.parse().map(|v: u32| imovel.quartos == v).unwrap_or(false),
            "banheiros" => value.parse().map(|v: u32| imovel.banheiros == v).unwrap_or(false),
            "vagas_garagem" => value
                .parse()
                .map(|v: u32| imovel.vagas_garagem == v)
                .unwrap_or(false),
            "preco_venda__gte" => value
                .parse()
                .map(|v: f64| imovel.preco_venda.map_or(false, |p| p >= v))
                .unwrap_or(false),
            "preco_venda__lte" => value
                .parse()
                .map(|v: f64| imovel.preco_venda.map_or(false, |p| p <= v))
                .unwrap_or(false),
            "area_total__gte" => value
                .parse()
                .map(|v: f64| imovel.area_total >= v)
                .unwrap_or(false),
            "area_total__lte" => value
                .parse()
                .map(|v: f64| imovel.area_total <= v)
                .unwrap_or(false),
            "piscina" => imovel.piscina == (value == "true"),
            "aceita_pets" => imovel.aceita_pets == (value == "true"),
            "mobiliado" => imovel.mobiliado == (value == "true"),
            "search" => {
                let needle = value.to_lowercase();
                imovel.titulo.to_lowercase().contains(&needle)
                    || imovel.descricao.to_lowercase().contains(&needle)
                    || imovel.bairro.to_lowercase().contains(&needle)
                    || imovel.cidade.to_lowercase().contains(&needle)
            }
            _ => true,
        };
        if !ok {
            return false;
        }
    }
    true
}

fn sort_imoveis(imoveis: &mut [Imovel], ordering: &str) {
    match ordering {
        "criado_em" => imoveis.sort_by_key(|i| i.criado_em),
        "preco" => imoveis.sort_by(|a, b| {
            a.preco.partial_cmp(&b.preco).unwrap_or(std::cmp::Ordering::Equal)
        }),
        "-preco" => imoveis.sort_by(|a, b| {
            b.preco.partial_cmp(&a.preco).unwrap_or(std::cmp::Ordering::Equal)
        }),
        "area_total" => imoveis.sort_by(|a, b| {
            a.area_total
                .partial_cmp(&b.area_total)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        // default: newest first
        _ => imoveis.sort_by(|a, b| b.criado_em.cmp(&a.criado_em)),
    }
}

fn page_url(params: &HashMap<String, String>, page: usize) -> String {
    let mut query = format!("page={page}");
    let mut keys: Vec<&String> = params.keys().filter(|k| k.as_str() != "page").collect();
    keys.sort();
    for key in keys {
        query.push('&');
        query.push_str(key);
        query.push('=');
        query.push_str(&params[key]);
    }
    format!("/api/imoveis/?{query}")
}

async fn list_imoveis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let imoveis = state.imoveis.read().await;
    let mut matched: Vec<Imovel> = imoveis
        .iter()
        .filter(|i| matches_filters(i, &params))
        .cloned()
        .collect();
    drop(imoveis);

    let ordering = params.get("ordering").map(String::as_str).unwrap_or("-criado_em");
    sort_imoveis(&mut matched, ordering);

    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let count = matched.len();
    let start = (page - 1) * PAGE_SIZE;
    let results: Vec<Imovel> = matched.into_iter().skip(start).take(PAGE_SIZE).collect();
    let next = (start + PAGE_SIZE < count).then(|| page_url(&params, page + 1));
    let previous = (page > 1).then(|| page_url(&params, page - 1));

    Json(json!({
        "count": count,
        "next": next,
        "previous": previous,
        "results": results,
    }))
}

async fn list_destaques(State(state): State<Arc<AppState>>) -> Json<Vec<Imovel>> {
    let imoveis = state.imoveis.read().await;
    let mut destaques: Vec<Imovel> = imoveis.iter().filter(|i| i.destaque).cloned().collect();
    sort_imoveis(&mut destaques, "-criado_em");
    Json(destaques)
}

async fn get_imovel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Imovel>, Rejection> {
    let imoveis = state.imoveis.read().await;
    imoveis
        .iter()
        .find(|i| i.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))
}

fn build_imovel(id: i64, input: ImovelInput) -> Imovel {
    let preco = input
        .preco
        .or(input.preco_venda)
        .or(input.valor_aluguel)
        .unwrap_or(0.0);
    let now = Utc::now();
    Imovel {
        id,
        titulo: input.titulo.unwrap_or_default(),
        descricao: input.descricao.unwrap_or_default(),
        tipo_imovel: input.tipo_imovel.unwrap_or_else(|| "casa".to_string()),
        tipo_negocio: input.tipo_negocio.unwrap_or_else(|| "venda".to_string()),
        preco_venda: input.preco_venda,
        valor_aluguel: input.valor_aluguel,
        preco,
        area_total: input.area_total.unwrap_or(0.0),
        area_construida: input.area_construida,
        quartos: input.quartos.unwrap_or(0),
        banheiros: input.banheiros.unwrap_or(0),
        vagas_garagem: input.vagas_garagem.unwrap_or(0),
        rua: input.rua.unwrap_or_default(),
        numero: input.numero.unwrap_or_default(),
        complemento: input.complemento,
        bairro: input.bairro.unwrap_or_default(),
        cidade: input.cidade.unwrap_or_default(),
        estado: input.estado.unwrap_or_default(),
        cep: input.cep.unwrap_or_default(),
        piscina: input.piscina.unwrap_or(false),
        aceita_pets: input.aceita_pets.unwrap_or(false),
        mobiliado: input.mobiliado.unwrap_or(false),
        destaque: input.destaque.unwrap_or(false),
        imagem_principal: None,
        imagens: Vec::new(),
        criado_em: now,
        atualizado_em: now,
    }
}

async fn create_imovel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<ImovelInput>,
) -> Result<(StatusCode, Json<Imovel>), Rejection> {
    require_auth(&state, &headers)?;
    let imovel = build_imovel(state.alloc_id(), input);
    state.imoveis.write().await.push(imovel.clone());
    Ok((StatusCode::CREATED, Json(imovel)))
}

async fn update_imovel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<ImovelInput>,
) -> Result<Json<Imovel>, Rejection> {
    require_auth(&state, &headers)?;
    let mut imoveis = state.imoveis.write().await;
    let imovel = imoveis
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))?;

    if let Some(titulo) = input.titulo {
        imovel.titulo = titulo;
    }
    if let Some(descricao) = input.descricao {
        imovel.descricao = descricao;
    }
    if let Some(tipo_imovel) = input.tipo_imovel {
        imovel.tipo_imovel = tipo_imovel;
    }
    if let Some(tipo_negocio) = input.tipo_negocio {
        imovel.tipo_negocio = tipo_negocio;
    }
    if input.preco_venda.is_some() {
        imovel.preco_venda = input.preco_venda;
    }
    if input.valor_aluguel.is_some() {
        imovel.valor_aluguel = input.valor_aluguel;
    }
    if let Some(preco) = input.preco {
        imovel.preco = preco;
    }
    if let Some(area_total) = input.area_total {
        imovel.area_total = area_total;
    }
    if input.area_construida.is_some() {
        imovel.area_construida = input.area_construida;
    }
    if let Some(quartos) = input.quartos {
        imovel.quartos = quartos;
    }
    if let Some(banheiros) = input.banheiros {
        imovel.banheiros = banheiros;
    }
    if let Some(vagas_garagem) = input.vagas_garagem {
        imovel.vagas_garagem = vagas_garagem;
    }
    if let Some(rua) = input.rua {
        imovel.rua = rua;
    }
    if let Some(numero) = input.numero {
        imovel.numero = numero;
    }
    if input.complemento.is_some() {
        imovel.complemento = input.complemento;
    }
    if let Some(bairro) = input.bairro {
        imovel.bairro = bairro;
    }
    if let Some(cidade) = input.cidade {
        imovel.cidade = cidade;
    }
    if let Some(estado) = input.estado {
        imovel.estado = estado;
    }
    if let Some(cep) = input.cep {
        imovel.cep = cep;
    }
    if let Some(piscina) = input.piscina {
        imovel.piscina = piscina;
    }
    if let Some(aceita_pets) = input.aceita_pets {
        imovel.aceita_pets = aceita_pets;
    }
    if let Some(mobiliado) = input.mobiliado {
        imovel.mobiliado = mobiliado;
    }
    if let Some(destaque) = input.destaque {
        imovel.destaque = destaque;
    }
    imovel.atualizado_em = Utc::now();
    Ok(Json(imovel.clone()))
}

async fn delete_imovel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, Rejection> {
    require_auth(&state, &headers)?;
    let mut imoveis = state.imoveis.write().await;
    let before = imoveis.len();
    imoveis.retain(|i| i.id != id);
    if imoveis.len() == before {
        return Err(reject(StatusCode::NOT_FOUND, "Não encontrado."));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_imagem(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImovelImagem>), Rejection> {
    require_auth(&state, &headers)?;

    let mut data: Option<Vec<u8>> = None;
    let mut ordem = 0u32;
    let mut principal = false;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "multipart inválido"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("imagem") => {
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|_| reject(StatusCode::BAD_REQUEST, "multipart inválido"))?
                        .to_vec(),
                );
            }
            Some("ordem") => {
                ordem = field
                    .text()
                    .await
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(0);
            }
            Some("principal") => {
                principal = field.text().await.map(|t| t == "true").unwrap_or(false);
            }
            _ => {}
        }
    }
    let data = data.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "campo imagem ausente"))?;
    if data.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "imagem vazia"));
    }

    let mut imoveis = state.imoveis.write().await;
    let imovel = imoveis
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))?;

    let imagem = ImovelImagem {
        id: state.alloc_id(),
        imagem_url: format!("/media/imoveis/{}.jpg", Uuid::new_v4()),
        ordem,
        principal,
    };
    if principal || imovel.imagem_principal.is_none() {
        imovel.imagem_principal = Some(imagem.imagem_url.clone());
    }
    imovel.imagens.push(imagem.clone());
    imovel.atualizado_em = Utc::now();
    Ok((StatusCode::CREATED, Json(imagem)))
}

async fn toggle_destaque(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Imovel>, Rejection> {
    require_auth(&state, &headers)?;
    let mut imoveis = state.imoveis.write().await;
    let imovel = imoveis
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))?;
    imovel.destaque = !imovel.destaque;
    imovel.atualizado_em = Utc::now();
    Ok(Json(imovel.clone()))
}

// ---------------------------------------------------------------------------
// Lead handlers
// ---------------------------------------------------------------------------

async fn list_leads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Lead>>, Rejection> {
    require_auth(&state, &headers)?;
    let leads = state.leads.read().await;
    let mut filtered: Vec<Lead> = leads
        .iter()
        .filter(|l| {
            params
                .get("status_filter")
                .map_or(true, |status| l.status == *status)
        })
        .cloned()
        .collect();
    filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(filtered))
}

#[derive(Deserialize)]
struct ContatoRequest {
    nome: String,
    email: String,
    telefone: String,
    mensagem: Option<String>,
    origem: Option<String>,
}

async fn create_contato(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContatoRequest>,
) -> (StatusCode, Json<Lead>) {
    let lead = Lead {
        id: state.alloc_id(),
        nome: body.nome,
        email: body.email,
        telefone: body.telefone,
        mensagem: body.mensagem,
        status: "novo".to_string(),
        origem: body.origem,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.leads.write().await.push(lead.clone());
    (StatusCode::CREATED, Json(lead))
}

#[derive(Deserialize)]
struct LeadUpdate {
    status: Option<String>,
    nome: Option<String>,
    email: Option<String>,
    telefone: Option<String>,
    mensagem: Option<String>,
}

async fn update_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<LeadUpdate>,
) -> Result<Json<Lead>, Rejection> {
    require_auth(&state, &headers)?;
    let mut leads = state.leads.write().await;
    let lead = leads
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))?;
    if let Some(status) = body.status {
        lead.status = status;
    }
    if let Some(nome) = body.nome {
        lead.nome = nome;
    }
    if let Some(email) = body.email {
        lead.email = email;
    }
    if let Some(telefone) = body.telefone {
        lead.telefone = telefone;
    }
    if body.mensagem.is_some() {
        lead.mensagem = body.mensagem;
    }
    lead.updated_at = Some(Utc::now());
    Ok(Json(lead.clone()))
}

async fn delete_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, Rejection> {
    require_auth(&state, &headers)?;
    let mut leads = state.leads.write().await;
    let before = leads.len();
    leads.retain(|l| l.id != id);
    if leads.len() == before {
        return Err(reject(StatusCode::NOT_FOUND, "Não encontrado."));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

async fn list_visitas(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Visita>>, Rejection> {
    require_auth(&state, &headers)?;
    let visitas = state.visitas.read().await;
    let mut sorted = visitas.clone();
    sorted.sort_by(|a, b| a.data_hora.cmp(&b.data_hora));
    Ok(Json(sorted))
}

#[derive(Deserialize)]
struct VisitaUpdate {
    status: Option<String>,
    observacoes: Option<String>,
    data_hora: Option<DateTime<Utc>>,
}

async fn update_visita(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<VisitaUpdate>,
) -> Result<Json<Visita>, Rejection> {
    require_auth(&state, &headers)?;
    let mut visitas = state.visitas.write().await;
    let visita = visitas
        .iter_mut()
        .find(|v| v.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))?;
    if let Some(status) = body.status {
        visita.status = status;
    }
    if body.observacoes.is_some() {
        visita.observacoes = body.observacoes;
    }
    if let Some(data_hora) = body.data_hora {
        visita.data_hora = data_hora;
    }
    visita.updated_at = Some(Utc::now());
    Ok(Json(visita.clone()))
}

async fn delete_visita(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, Rejection> {
    require_auth(&state, &headers)?;
    let mut visitas = state.visitas.write().await;
    let before = visitas.len();
    visitas.retain(|v| v.id != id);
    if visitas.len() == before {
        return Err(reject(StatusCode::NOT_FOUND, "Não encontrado."));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    require_auth(&state, &headers)?;
    let total_imoveis = state.imoveis.read().await.len();
    let leads = state.leads.read().await;
    let total_leads = leads.len();
    let conversoes = leads.iter().filter(|l| l.status == "convertido").count();
    drop(leads);
    let visitas_agendadas = state
        .visitas
        .read()
        .await
        .iter()
        .filter(|v| v.status == "agendada")
        .count();

    Ok(Json(json!({
        "total_imoveis": total_imoveis,
        "total_leads": total_leads,
        "visitas_agendadas": visitas_agendadas,
        "conversoes": conversoes,
    })))
}

async fn get_config(State(state): State<Arc<AppState>>) -> Result<Json<SiteConfig>, Rejection> {
    state
        .config
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Não encontrado."))
}

async fn put_config(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SiteConfig>,
) -> Result<Json<SiteConfig>, Rejection> {
    require_auth(&state, &headers)?;
    *state.config.write().await = Some(body.clone());
    Ok(Json(body))
}
