use std::sync::Arc;

use mock_server::{AppState, ImovelInput};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let state = Arc::new(AppState::new());
    state
        .seed_user("admin", "admin@imobilux.com.br", "admin123")
        .await;
    state
        .seed_imoveis(vec![
            ImovelInput {
                titulo: Some("Casa com piscina em Boa Viagem".to_string()),
                descricao: Some("Ampla casa a duas quadras da praia".to_string()),
                tipo_imovel: Some("casa".to_string()),
                tipo_negocio: Some("venda".to_string()),
                preco_venda: Some(850_000.0),
                area_total: Some(320.0),
                quartos: Some(4),
                banheiros: Some(3),
                vagas_garagem: Some(2),
                bairro: Some("Boa Viagem".to_string()),
                cidade: Some("Recife".to_string()),
                estado: Some("PE".to_string()),
                piscina: Some(true),
                destaque: Some(true),
                ..Default::default()
            },
            ImovelInput {
                titulo: Some("Apartamento mobiliado no Espinheiro".to_string()),
                tipo_imovel: Some("apartamento".to_string()),
                tipo_negocio: Some("aluguel".to_string()),
                valor_aluguel: Some(3_200.0),
                area_total: Some(95.0),
                quartos: Some(3),
                banheiros: Some(2),
                vagas_garagem: Some(1),
                bairro: Some("Espinheiro".to_string()),
                cidade: Some("Recife".to_string()),
                estado: Some("PE".to_string()),
                mobiliado: Some(true),
                aceita_pets: Some(true),
                ..Default::default()
            },
            ImovelInput {
                titulo: Some("Terreno comercial na Avenida Norte".to_string()),
                tipo_imovel: Some("terreno".to_string()),
                tipo_negocio: Some("venda".to_string()),
                preco_venda: Some(420_000.0),
                area_total: Some(600.0),
                cidade: Some("Recife".to_string()),
                estado: Some("PE".to_string()),
                ..Default::default()
            },
        ])
        .await;

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr}");
    mock_server::run_with_state(listener, state).await
}
