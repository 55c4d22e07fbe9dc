//! Full catalog, lead and back-office lifecycle tests against the live
//! mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the domain
//! stores over real HTTP: listing CRUD with filters and pagination,
//! image upload, the featured flag, the lead pipeline, visit
//! scheduling, dashboard stats and the site configuration fallback.

use std::sync::Arc;

use imobiliaria_core::{
    AdminStore, ApiClient, ApiConfig, ContatoForm, FilterPatch, ImovelInput, LeadStatus,
    LeadStore, ListingStore, ListingFilters, MemoryTokenStorage, NoticeLevel, RecordingNotifier,
    SessionStore, SiteConfig, VisitaStatus,
};
use mock_server::AppState;

async fn start_server(
    state: Arc<AppState>,
) -> (String, tokio::task::JoinHandle<Result<(), std::io::Error>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(mock_server::run_with_state(listener, state));
    (format!("http://{addr}"), handle)
}

async fn seeded_server() -> (
    Arc<AppState>,
    String,
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
) {
    let state = Arc::new(AppState::new());
    state
        .seed_user("admin", "admin@imobilux.com.br", "admin123")
        .await;
    let (base, handle) = start_server(state.clone()).await;
    (state, base, handle)
}

fn anonymous_client(base: &str) -> ApiClient {
    ApiClient::new(ApiConfig::new(base), Arc::new(MemoryTokenStorage::new())).unwrap()
}

async fn logged_in_client(base: &str) -> ApiClient {
    let client = anonymous_client(base);
    let session = SessionStore::new(client.clone());
    let outcome = session.login("admin", "admin123").await;
    assert!(outcome.success, "admin login failed: {:?}", outcome.error);
    client
}

fn casa_recife() -> ImovelInput {
    ImovelInput {
        titulo: Some("Casa com piscina em Boa Viagem".to_string()),
        descricao: Some("Ampla casa a duas quadras da praia".to_string()),
        tipo_imovel: Some(imobiliaria_core::TipoImovel::Casa),
        tipo_negocio: Some(imobiliaria_core::TipoNegocio::Venda),
        preco_venda: Some(300_000.0),
        area_total: Some(320.0),
        quartos: Some(4),
        banheiros: Some(3),
        vagas_garagem: Some(2),
        bairro: Some("Boa Viagem".to_string()),
        cidade: Some("Recife".to_string()),
        estado: Some("PE".to_string()),
        piscina: Some(true),
        ..Default::default()
    }
}

#[tokio::test]
async fn catalog_crud_lifecycle() {
    let (_state, base, _handle) = seeded_server().await;
    let client = logged_in_client(&base).await;
    let notifier = Arc::new(RecordingNotifier::new());
    let listings = ListingStore::new(client, notifier.clone());

    // Step 1: empty catalog.
    listings.fetch_imoveis(1, None).await;
    assert!(listings.imoveis().is_empty());
    assert_eq!(listings.pagination().count, 0);

    // Step 2: create three listings.
    let casa = listings.create(&casa_recife()).await.unwrap();
    let apartamento = listings
        .create(&ImovelInput {
            titulo: Some("Apartamento no centro de Olinda".to_string()),
            tipo_imovel: Some(imobiliaria_core::TipoImovel::Apartamento),
            tipo_negocio: Some(imobiliaria_core::TipoNegocio::Venda),
            preco_venda: Some(200_000.0),
            area_total: Some(80.0),
            quartos: Some(2),
            cidade: Some("Olinda".to_string()),
            estado: Some("PE".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let alugada = listings
        .create(&ImovelInput {
            titulo: Some("Casa para alugar no Espinheiro".to_string()),
            tipo_imovel: Some(imobiliaria_core::TipoImovel::Casa),
            tipo_negocio: Some(imobiliaria_core::TipoNegocio::Aluguel),
            valor_aluguel: Some(2_500.0),
            area_total: Some(150.0),
            quartos: Some(3),
            cidade: Some("Recife".to_string()),
            estado: Some("PE".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    // Step 3: full page.
    listings.fetch_imoveis(1, None).await;
    assert_eq!(listings.imoveis().len(), 3);
    assert_eq!(listings.pagination().count, 3);
    assert!(listings.pagination().next.is_none());

    // Step 4: a filter override narrows one fetch without persisting.
    listings
        .fetch_imoveis(
            1,
            Some(&FilterPatch {
                cidade: Some("Recife".to_string()),
                ..Default::default()
            }),
        )
        .await;
    assert_eq!(listings.imoveis().len(), 2);
    assert_eq!(listings.filtros(), ListingFilters::default());

    // Step 5: persisted filters with the documented renames.
    listings.update_filtros(&FilterPatch {
        preco_min: Some("100".to_string()),
        preco_max: Some("500000".to_string()),
        piscina: Some(true),
        ..Default::default()
    });
    listings.fetch_imoveis(1, None).await;
    let filtered = listings.imoveis();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, casa.id);

    // Step 6: clearing filters restores the whole catalog.
    listings.limpar_filtros();
    listings.fetch_imoveis(1, None).await;
    assert_eq!(listings.imoveis().len(), 3);

    // Step 7: update a listing.
    let updated = listings
        .update(
            apartamento.id,
            &ImovelInput {
                titulo: Some("Apartamento reformado em Olinda".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.titulo, "Apartamento reformado em Olinda");
    assert_eq!(updated.preco_venda, Some(200_000.0));

    // Step 8: featured flag round trip.
    let destacada = listings.toggle_destaque(casa.id).await.unwrap();
    assert!(destacada.destaque);
    listings.fetch_destaques().await;
    assert_eq!(listings.destaques().len(), 1);
    let removida = listings.toggle_destaque(casa.id).await.unwrap();
    assert!(!removida.destaque);
    listings.fetch_destaques().await;
    assert!(listings.destaques().is_empty());

    // Step 9: image upload.
    let imagem = listings
        .upload_imagem(casa.id, b"fake image bytes".to_vec(), "fachada.jpg", 0, true)
        .await
        .unwrap();
    assert!(imagem.principal);
    assert!(imagem.imagem_url.starts_with("/media/imoveis/"));
    let detalhe = listings.fetch_imovel(casa.id).await.unwrap();
    assert_eq!(detalhe.imagens.as_ref().unwrap().len(), 1);
    assert_eq!(detalhe.imagem_principal.as_deref(), Some(imagem.imagem_url.as_str()));
    assert_eq!(listings.imovel_atual().unwrap().id, casa.id);

    // Step 10: delete succeeds once, then reports failure.
    assert!(listings.remove(alugada.id).await);
    listings.fetch_imoveis(1, None).await;
    assert_eq!(listings.imoveis().len(), 2);
    assert!(!listings.remove(alugada.id).await);
    assert_eq!(listings.imoveis().len(), 2);

    // Step 11: missing detail pages notify and return None.
    assert!(listings.fetch_imovel(9999).await.is_none());
    assert!(notifier.notices().contains(&(
        NoticeLevel::Error,
        "Erro ao carregar detalhes do imóvel".to_string()
    )));
}

#[tokio::test]
async fn pagination_splits_pages_of_twelve() {
    let (state, base, _handle) = seeded_server().await;
    let mut inputs = Vec::new();
    for n in 0..15 {
        inputs.push(mock_server::ImovelInput {
            titulo: Some(format!("Imóvel {n}")),
            preco_venda: Some(100_000.0 + f64::from(n)),
            cidade: Some("Recife".to_string()),
            ..Default::default()
        });
    }
    state.seed_imoveis(inputs).await;

    let client = anonymous_client(&base);
    let listings = ListingStore::new(client, Arc::new(RecordingNotifier::new()));

    listings.fetch_imoveis(1, None).await;
    assert_eq!(listings.imoveis().len(), 12);
    assert_eq!(listings.pagination().count, 15);
    assert!(listings.pagination().next.is_some());
    assert!(listings.pagination().previous.is_none());

    listings.fetch_imoveis(2, None).await;
    assert_eq!(listings.imoveis().len(), 3);
    assert!(listings.pagination().next.is_none());
    assert!(listings.pagination().previous.is_some());
}

#[tokio::test]
async fn featured_fetch_failure_resets_to_empty() {
    let (state, base, handle) = seeded_server().await;
    state
        .seed_imoveis(vec![mock_server::ImovelInput {
            titulo: Some("Destaque".to_string()),
            destaque: Some(true),
            ..Default::default()
        }])
        .await;

    let client = anonymous_client(&base);
    let listings = ListingStore::new(client, Arc::new(RecordingNotifier::new()));
    listings.fetch_destaques().await;
    assert_eq!(listings.destaques().len(), 1);

    // Take the server down; the next fetch must clear the stale list.
    handle.abort();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    listings.fetch_destaques().await;
    assert!(listings.destaques().is_empty());
}

#[tokio::test]
async fn lead_pipeline_from_contact_to_removal() {
    let (_state, base, _handle) = seeded_server().await;

    // A visitor submits the public contact form, unauthenticated.
    let public = LeadStore::new(
        anonymous_client(&base),
        Arc::new(RecordingNotifier::new()),
    );
    let enviado = public
        .enviar_contato(&ContatoForm {
            nome: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            telefone: "(81) 99999-0000".to_string(),
            mensagem: "Tenho interesse na casa de Boa Viagem".to_string(),
        })
        .await;
    assert!(enviado);

    // The back office works the lead through the pipeline.
    let client = logged_in_client(&base).await;
    let leads = LeadStore::new(client, Arc::new(RecordingNotifier::new()));

    leads.fetch_leads(None).await;
    let all = leads.leads();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, LeadStatus::Novo);
    assert_eq!(all[0].origem.as_deref(), Some("pagina_contato"));
    let id = all[0].id;

    assert!(leads.update_status(id, LeadStatus::Contatado).await);
    assert_eq!(leads.leads()[0].status, LeadStatus::Contatado);

    leads.fetch_leads(Some(LeadStatus::Novo)).await;
    assert!(leads.leads().is_empty());
    leads.fetch_leads(Some(LeadStatus::Contatado)).await;
    assert_eq!(leads.leads().len(), 1);

    leads.fetch_leads(None).await;
    assert!(leads.remove(id).await);
    assert!(leads.leads().is_empty());

    assert!(!leads.update_status(999, LeadStatus::Perdido).await);
}

#[tokio::test]
async fn visit_scheduling_admin_flow() {
    let (state, base, _handle) = seeded_server().await;
    let imovel_ids = state.seed_imoveis(vec![mock_server::ImovelInput::default()]).await;
    state.seed_visita(imovel_ids[0], "Maria", "agendada").await;
    let confirmada_id = state.seed_visita(imovel_ids[0], "Joao", "confirmada").await;

    let client = logged_in_client(&base).await;
    let admin = AdminStore::new(client, Arc::new(RecordingNotifier::new()));

    admin.fetch_visitas().await;
    let visitas = admin.visitas();
    assert_eq!(visitas.len(), 2);

    assert!(
        admin
            .update_visita_status(confirmada_id, VisitaStatus::Realizada)
            .await
    );
    let realizada = admin
        .visitas()
        .into_iter()
        .find(|v| v.id == confirmada_id)
        .unwrap();
    assert_eq!(realizada.status, VisitaStatus::Realizada);

    assert!(admin.remove_visita(confirmada_id).await);
    assert_eq!(admin.visitas().len(), 1);

    assert!(!admin.remove_visita(confirmada_id).await);
}

#[tokio::test]
async fn dashboard_stats_reflect_the_pipeline() {
    let (state, base, _handle) = seeded_server().await;
    let client = logged_in_client(&base).await;

    let listings = ListingStore::new(client.clone(), Arc::new(RecordingNotifier::new()));
    let imovel = listings.create(&casa_recife()).await.unwrap();
    state.seed_visita(imovel.id, "Maria", "agendada").await;

    let leads = LeadStore::new(client.clone(), Arc::new(RecordingNotifier::new()));
    assert!(
        leads
            .enviar_contato(&ContatoForm {
                nome: "Comprador".to_string(),
                email: "comprador@example.com".to_string(),
                telefone: "(81) 98888-0000".to_string(),
                mensagem: "Fechamos negócio".to_string(),
            })
            .await
    );
    leads.fetch_leads(None).await;
    let lead_id = leads.leads()[0].id;
    assert!(leads.update_status(lead_id, LeadStatus::Convertido).await);

    let admin = AdminStore::new(client, Arc::new(RecordingNotifier::new()));
    let stats = admin.fetch_stats().await.unwrap();
    assert_eq!(stats.total_imoveis, 1);
    assert_eq!(stats.total_leads, 1);
    assert_eq!(stats.visitas_agendadas, 1);
    assert_eq!(stats.conversoes, 1);
}

#[tokio::test]
async fn site_config_defaults_until_saved() {
    let (_state, base, _handle) = seeded_server().await;
    let client = logged_in_client(&base).await;
    let admin = AdminStore::new(client, Arc::new(RecordingNotifier::new()));

    // Nothing saved yet: the documented defaults.
    let config = admin.fetch_config().await;
    assert_eq!(config, SiteConfig::default());
    assert_eq!(config.nome_empresa, "ImobiLux");

    let custom = SiteConfig {
        nome_empresa: "Imobiliária Atlântico".to_string(),
        ..SiteConfig::default()
    };
    assert!(admin.update_config(&custom).await);
    assert_eq!(admin.fetch_config().await.nome_empresa, "Imobiliária Atlântico");

    // Saving requires authentication.
    let anon = AdminStore::new(anonymous_client(&base), Arc::new(RecordingNotifier::new()));
    assert!(!anon.update_config(&custom).await);
    assert_eq!(anon.fetch_config().await.nome_empresa, "Imobiliária Atlântico");
}
