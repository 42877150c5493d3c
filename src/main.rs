//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use obreiros::{app::build_router, bootstrap, config::{AppState, Settings}};

#[tokio::main]
async fn main() {
    // RUST_LOG tem precedência; sem ele, nível info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env().expect("Configuração inválida.");
    let app_state = AppState::new(&settings)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Faz o app rodar as migrações do SQLx na inicialização
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!()
            .run(pool)
            .await
            .expect("Falha ao rodar as migrações do banco de dados.");
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    bootstrap::ensure_admin(&app_state)
        .await
        .expect("Falha ao criar o administrador padrão.");

    let app = build_router(app_state);

    let listener = TcpListener::bind(&settings.server_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!(
        "🚀 Servidor escutando em {}",
        listener.local_addr().expect("Endereço local indisponível")
    );
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
