// src/services/transactional_ledger.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, PurchaseRepository},
    models::{
        customer::normalize_phone,
        purchase::{PurchaseReceipt, PurchaseRequest},
    },
    services::ledger_service::{build_purchase, plan_purchase, plan_reversal, CashbackLedger},
};

/// Mesmo contrato do `LedgerService`, mas as duas escritas rodam numa única
/// transação do Postgres e a linha do cliente fica travada (FOR UPDATE) entre a
/// leitura e a escrita do saldo. Operações concorrentes no mesmo cliente são
/// serializadas pelo banco.
#[derive(Clone)]
pub struct TransactionalLedger {
    pool: PgPool,
    customer_repo: CustomerRepository,
    purchase_repo: PurchaseRepository,
}

impl TransactionalLedger {
    pub fn new(
        pool: PgPool,
        customer_repo: CustomerRepository,
        purchase_repo: PurchaseRepository,
    ) -> Self {
        Self { pool, customer_repo, purchase_repo }
    }
}

#[async_trait]
impl CashbackLedger for TransactionalLedger {
    async fn register_purchase(
        &self,
        store_id: Uuid,
        request: PurchaseRequest,
    ) -> Result<PurchaseReceipt, AppError> {
        let phone = normalize_phone(&request.customer_phone);

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 1. Lê e trava o cliente
        let mut customer = self
            .customer_repo
            .find_active_by_phone_for_update(&mut *tx, &phone, store_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        // 2. Valida (um erro aqui faz rollback no drop do `tx`)
        let change = plan_purchase(customer.cashback_balance, &request).inspect_err(|e| {
            tracing::warn!(customer_id = %customer.id, "Compra recusada: {}", e);
        })?;

        // 3. Grava a compra
        let purchase = self
            .purchase_repo
            .upsert(&mut *tx, &build_purchase(&customer, &request, change.earned))
            .await?;

        // 4. Grava o saldo
        customer.cashback_balance = change.new_balance;
        let customer = self.customer_repo.update(&mut *tx, &customer).await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(
            purchase_id = %purchase.id,
            customer_id = %customer.id,
            earned = %change.earned,
            redeemed = %change.redeemed,
            balance = %customer.cashback_balance,
            "💰 Compra registrada (transacional)"
        );

        Ok(PurchaseReceipt {
            purchase,
            customer,
            cashback_added: change.earned,
            cashback_used: change.redeemed,
        })
    }

    async fn reverse_purchase(&self, store_id: Uuid, purchase_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava a compra: um segundo estorno concorrente espera e depois a vê inativa
        let mut purchase = self
            .purchase_repo
            .find_by_id_for_update(&mut *tx, purchase_id)
            .await?
            .filter(|p| p.store_id == store_id && p.is_active)
            .ok_or(AppError::PurchaseNotFound)?;

        // 2-4. Ajusta o saldo, se o cliente ainda existir
        match self
            .customer_repo
            .find_by_id_for_update(&mut *tx, purchase.customer_id)
            .await?
        {
            Some(mut customer) => {
                customer.cashback_balance =
                    plan_reversal(customer.cashback_balance, purchase.cashback_amount)?;
                self.customer_repo.update(&mut *tx, &customer).await?;
            }
            None => {
                tracing::warn!(
                    purchase_id = %purchase.id,
                    customer_id = %purchase.customer_id,
                    "Cliente da compra não existe mais; estorno sem ajuste de saldo"
                );
            }
        }

        // 5. Soft delete
        purchase.is_active = false;
        self.purchase_repo.upsert(&mut *tx, &purchase).await?;

        tx.commit().await?;

        tracing::info!(
            purchase_id = %purchase.id,
            reversed = %purchase.cashback_amount,
            "↩️ Compra estornada (transacional)"
        );
        Ok(())
    }
}

// Precisam de um Postgres de verdade: `DATABASE_URL=... cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::{Customer, NewCustomer};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct Seeded {
        ledger: TransactionalLedger,
        store_id: Uuid,
        customer: Customer,
    }

    async fn seed(pool: &PgPool, balance: Decimal) -> Seeded {
        let store_id: Uuid = sqlx::query_scalar("INSERT INTO stores (name) VALUES ($1) RETURNING id")
            .bind("Padaria Central")
            .fetch_one(pool)
            .await
            .unwrap();

        let customer_repo = CustomerRepository::new(pool.clone());
        let mut customer = customer_repo
            .create(
                pool,
                &NewCustomer { store_id, name: Some("Ana".into()), phone_number: "111".into() },
            )
            .await
            .unwrap();
        customer.cashback_balance = balance;
        let customer = customer_repo.update(pool, &customer).await.unwrap();

        let ledger = TransactionalLedger::new(
            pool.clone(),
            customer_repo,
            PurchaseRepository::new(pool.clone()),
        );
        Seeded { ledger, store_id, customer }
    }

    fn request(amount: Decimal, pct: Decimal, to_use: Decimal) -> PurchaseRequest {
        PurchaseRequest {
            customer_phone: "111".into(),
            purchase_amount: amount,
            cashback_percentage: pct,
            use_existing_cashback: to_use > Decimal::ZERO,
            cashback_to_use: to_use,
            description: None,
        }
    }

    async fn balance_of(seeded: &Seeded, pool: &PgPool) -> Decimal {
        seeded
            .ledger
            .customer_repo
            .find_by_id(pool, seeded.customer.id)
            .await
            .unwrap()
            .unwrap()
            .cashback_balance
    }

    async fn purchase_count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "Requer Postgres (DATABASE_URL)"]
    async fn purchase_and_balance_commit_together(pool: PgPool) {
        let seeded = seed(&pool, Decimal::ZERO).await;

        let receipt = seeded
            .ledger
            .register_purchase(seeded.store_id, request(dec!(200), dec!(5), dec!(0)))
            .await
            .unwrap();

        assert_eq!(receipt.purchase.cashback_amount, dec!(10));
        assert_eq!(receipt.customer.cashback_balance, dec!(10));
        assert_eq!(balance_of(&seeded, &pool).await, dec!(10));

        let stored = seeded
            .ledger
            .purchase_repo
            .find_by_id(&pool, receipt.purchase.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_active);
        assert_eq!(stored.description, "regular purchase");
    }

    #[sqlx::test]
    #[ignore = "Requer Postgres (DATABASE_URL)"]
    async fn insufficient_balance_rolls_back(pool: PgPool) {
        let seeded = seed(&pool, dec!(50)).await;

        let err = seeded
            .ledger
            .register_purchase(seeded.store_id, request(dec!(100), dec!(10), dec!(60)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientCashback));
        assert_eq!(balance_of(&seeded, &pool).await, dec!(50));
        assert_eq!(purchase_count(&pool).await, 0);
    }

    #[sqlx::test]
    #[ignore = "Requer Postgres (DATABASE_URL)"]
    async fn second_reversal_is_not_found(pool: PgPool) {
        let seeded = seed(&pool, dec!(25)).await;

        let receipt = seeded
            .ledger
            .register_purchase(seeded.store_id, request(dec!(150), dec!(10), dec!(0)))
            .await
            .unwrap();
        assert_eq!(balance_of(&seeded, &pool).await, dec!(40));

        seeded
            .ledger
            .reverse_purchase(seeded.store_id, receipt.purchase.id)
            .await
            .unwrap();
        assert_eq!(balance_of(&seeded, &pool).await, dec!(25));

        let err = seeded
            .ledger
            .reverse_purchase(seeded.store_id, receipt.purchase.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PurchaseNotFound));
        assert_eq!(balance_of(&seeded, &pool).await, dec!(25));
    }
}
