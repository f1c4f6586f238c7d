// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CustomerRepository, CustomerStore, PurchaseRepository, PurchaseStore, StoreDirectory, StoreRepository},
    services::{
        CashbackLedger, CustomerService, LedgerService, PurchaseService, StoreService,
        TransactionalLedger,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Como as duas escritas de uma operação do ledger são feitas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerMode {
    // Leitura-alteração-escrita sem transação (com compensação em caso de falha)
    #[default]
    Plain,
    // Uma transação por operação, cliente travado com FOR UPDATE
    Transactional,
}

impl FromStr for LedgerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(LedgerMode::Plain),
            "transactional" => Ok(LedgerMode::Transactional),
            other => anyhow::bail!("LEDGER_MODE inválido: '{other}' (use 'plain' ou 'transactional')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub ledger_mode: LedgerMode,
}

impl AppConfig {
    /// Lê o `.env` (se existir) e depois o ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: '{raw}'"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let ledger_mode = match lookup("LEDGER_MODE") {
            Some(raw) => raw.parse()?,
            None => LedgerMode::default(),
        };

        Ok(Self { database_url, bind_addr, max_connections, ledger_mode })
    }

    pub async fn connect_database(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(pool)
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn CashbackLedger>,
    pub customer_service: CustomerService,
    pub purchase_service: PurchaseService,
    pub store_service: StoreService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(db_pool: PgPool, mode: LedgerMode) -> Self {
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let purchase_repo = PurchaseRepository::new(db_pool.clone());
        let store_repo = StoreRepository::new(db_pool.clone());

        let ledger: Arc<dyn CashbackLedger> = match mode {
            LedgerMode::Plain => Arc::new(LedgerService::new(
                Arc::new(customer_repo.clone()),
                Arc::new(purchase_repo.clone()),
            )),
            LedgerMode::Transactional => Arc::new(TransactionalLedger::new(
                db_pool,
                customer_repo.clone(),
                purchase_repo.clone(),
            )),
        };
        tracing::info!(?mode, "Ledger de cashback configurado");

        Self::with_stores(ledger, Arc::new(customer_repo), Arc::new(purchase_repo), Arc::new(store_repo))
    }

    /// Monta o estado sobre quaisquer implementações dos stores (os testes usam a de memória).
    pub fn with_stores(
        ledger: Arc<dyn CashbackLedger>,
        customers: Arc<dyn CustomerStore>,
        purchases: Arc<dyn PurchaseStore>,
        stores: Arc<dyn StoreDirectory>,
    ) -> Self {
        Self {
            ledger,
            customer_service: CustomerService::new(customers.clone()),
            purchase_service: PurchaseService::new(customers, purchases),
            store_service: StoreService::new(stores),
        }
    }
}
