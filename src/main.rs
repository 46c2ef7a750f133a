use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use product_catalog::{
    app::products::service::ProductService,
    config::{Backend, Config},
    create_router,
    infrastructure::{
        database::{DatabaseManager, PgProductStore},
        logger::Logger,
        memory::{MemoryProductStore, MemoryStorage},
        storage::{ObjectStorage, SupabaseStorage},
        store::ProductStore,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("加载配置失败")?;
    Logger::init(&config.logging);

    info!("启动商品目录服务 (backend = {:?})...", config.backend);

    let state = build_state(&config).await?;
    let app = create_router(state, &config.http);

    let address = config.listen_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("无法绑定到 {}", address))?;

    info!("🚀 服务运行在 http://{}", address);
    info!("   GET  /api/produtos           - 商品列表 (categoria, loja, termo, fuzzy, page, limit)");
    info!("   POST /api/cadastrar-produto  - 商品登记 (multipart, 图片字段 imagem)");
    info!("   静态页面目录: {}", config.http.static_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务器运行失败")?;

    info!("服务已停止");
    Ok(())
}

async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store: Arc<dyn ProductStore>;
    let storage: Arc<dyn ObjectStorage>;

    match config.backend {
        Backend::Postgres => {
            let database = DatabaseManager::new(&config.database)
                .await
                .context("连接数据库失败")?;
            store = Arc::new(PgProductStore::new(database.get_pool().clone()));
            storage = Arc::new(
                SupabaseStorage::new(&config.supabase, &config.storage)
                    .context("初始化对象存储失败")?,
            );
        }
        Backend::Memory => {
            info!("使用内存存储，重启后数据会丢失");
            store = Arc::new(MemoryProductStore::new());
            storage = Arc::new(MemoryStorage::new(format!(
                "memory://{}",
                config.storage.bucket
            )));
        }
    }

    Ok(AppState {
        product_service: ProductService::new(store, storage, config.storage.folder.clone()),
    })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("收到退出信号，正在关闭...");
    }
}
