// src/services/ledger_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerStore, PurchaseStore},
    models::{
        customer::{normalize_phone, Customer},
        purchase::{Purchase, PurchaseReceipt, PurchaseRequest, DEFAULT_DESCRIPTION},
    },
};

/// As duas únicas operações que alteram `cashback_balance`.
///
/// Quem chama já resolveu e autorizou a loja; o ledger não sabe nada de HTTP.
#[async_trait]
pub trait CashbackLedger: Send + Sync {
    async fn register_purchase(
        &self,
        store_id: Uuid,
        request: PurchaseRequest,
    ) -> Result<PurchaseReceipt, AppError>;

    async fn reverse_purchase(&self, store_id: Uuid, purchase_id: Uuid) -> Result<(), AppError>;
}

// ---
// Regras puras (sem I/O), compartilhadas pelas duas implementações
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    pub earned: Decimal,
    pub redeemed: Decimal,
    pub new_balance: Decimal,
}

/// `purchase_amount * cashback_percentage / 100`, sem arredondamento.
pub fn earned_cashback(
    purchase_amount: Decimal,
    cashback_percentage: Decimal,
) -> Result<Decimal, AppError> {
    purchase_amount
        .checked_mul(cashback_percentage)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| AppError::InvalidInput("O valor da compra é grande demais.".into()))
}

/// Valida o pedido contra o saldo atual e calcula o saldo novo.
/// O resgate é descontado mesmo quando `use_existing_cashback` é falso.
pub fn plan_purchase(
    current_balance: Decimal,
    request: &PurchaseRequest,
) -> Result<BalanceChange, AppError> {
    if request.purchase_amount < Decimal::ZERO {
        return Err(AppError::InvalidInput("O valor da compra não pode ser negativo.".into()));
    }
    if request.cashback_percentage < Decimal::ZERO
        || request.cashback_percentage > Decimal::ONE_HUNDRED
    {
        return Err(AppError::InvalidInput(
            "A porcentagem de cashback deve estar entre 0 e 100.".into(),
        ));
    }
    if request.cashback_to_use < Decimal::ZERO {
        return Err(AppError::InvalidInput(
            "O valor de cashback a usar não pode ser negativo.".into(),
        ));
    }

    let earned = earned_cashback(request.purchase_amount, request.cashback_percentage)?;
    let redeemed = request.cashback_to_use;

    if redeemed > current_balance {
        return Err(AppError::InsufficientCashback);
    }

    let new_balance = current_balance
        .checked_add(earned - redeemed)
        .ok_or_else(|| AppError::InvalidInput("O saldo de cashback excede o limite.".into()))?;

    Ok(BalanceChange { earned, redeemed, new_balance })
}

/// Estorno: tira só o cashback ganho na compra; o que foi resgatado não volta.
pub fn plan_reversal(current_balance: Decimal, cashback_amount: Decimal) -> Result<Decimal, AppError> {
    let new_balance = current_balance - cashback_amount;
    if new_balance < Decimal::ZERO {
        return Err(AppError::NegativeBalance);
    }
    Ok(new_balance)
}

pub fn build_purchase(customer: &Customer, request: &PurchaseRequest, earned: Decimal) -> Purchase {
    let now = Utc::now();
    // Guardada como veio; só uma descrição em branco vira a padrão
    let description = request
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();

    Purchase {
        id: Uuid::new_v4(),
        customer_id: customer.id,
        store_id: customer.store_id,
        purchase_amount: request.purchase_amount,
        cashback_percentage: request.cashback_percentage,
        cashback_amount: earned,
        purchase_date: now,
        description,
        is_active: true,
        created_at: now,
    }
}

// ---
// Implementação padrão: ler, alterar e gravar (sem transação)
// ---

/// Ledger sobre os contratos de armazenamento. Não há trava entre a leitura e a
/// escrita do saldo: duas compras simultâneas do mesmo cliente podem se
/// sobrescrever. Use `TransactionalLedger` quando isso importar.
#[derive(Clone)]
pub struct LedgerService {
    customers: Arc<dyn CustomerStore>,
    purchases: Arc<dyn PurchaseStore>,
}

impl LedgerService {
    pub fn new(customers: Arc<dyn CustomerStore>, purchases: Arc<dyn PurchaseStore>) -> Self {
        Self { customers, purchases }
    }
}

#[async_trait]
impl CashbackLedger for LedgerService {
    async fn register_purchase(
        &self,
        store_id: Uuid,
        request: PurchaseRequest,
    ) -> Result<PurchaseReceipt, AppError> {
        let phone = normalize_phone(&request.customer_phone);

        // 1. Lê o cliente
        let mut customer = self
            .customers
            .find_active_by_phone_and_store(&phone, store_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        // 2. Valida tudo antes de qualquer escrita
        let change = plan_purchase(customer.cashback_balance, &request).inspect_err(|e| {
            tracing::warn!(customer_id = %customer.id, "Compra recusada: {}", e);
        })?;

        // 3. Grava a compra
        let purchase = self
            .purchases
            .save(&build_purchase(&customer, &request, change.earned))
            .await?;

        // 4. Grava o saldo. Se falhar, desativa a compra para não deixar
        // um registro ativo sem o saldo correspondente.
        customer.cashback_balance = change.new_balance;
        let customer = match self.customers.save(&customer).await {
            Ok(saved) => saved,
            Err(err) => {
                let mut orphan = purchase.clone();
                orphan.is_active = false;
                if let Err(undo_err) = self.purchases.save(&orphan).await {
                    tracing::error!(
                        purchase_id = %purchase.id,
                        "Falha ao desfazer compra sem saldo: {:?}", undo_err
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            purchase_id = %purchase.id,
            customer_id = %customer.id,
            earned = %change.earned,
            redeemed = %change.redeemed,
            balance = %customer.cashback_balance,
            "💰 Compra registrada"
        );

        Ok(PurchaseReceipt {
            purchase,
            customer,
            cashback_added: change.earned,
            cashback_used: change.redeemed,
        })
    }

    async fn reverse_purchase(&self, store_id: Uuid, purchase_id: Uuid) -> Result<(), AppError> {
        // 1. Compra de outra loja ou já estornada conta como inexistente
        let mut purchase = self
            .purchases
            .find_by_id(purchase_id)
            .await?
            .filter(|p| p.store_id == store_id && p.is_active)
            .ok_or(AppError::PurchaseNotFound)?;

        // 2-4. Ajusta o saldo, se o cliente ainda existir
        let previous = match self.customers.find_by_id(purchase.customer_id).await? {
            Some(mut customer) => {
                let before = customer.clone();
                customer.cashback_balance =
                    plan_reversal(customer.cashback_balance, purchase.cashback_amount)?;
                self.customers.save(&customer).await?;
                Some(before)
            }
            None => {
                tracing::warn!(
                    purchase_id = %purchase.id,
                    customer_id = %purchase.customer_id,
                    "Cliente da compra não existe mais; estorno sem ajuste de saldo"
                );
                None
            }
        };

        // 5. Soft delete. Se falhar, devolve o saldo anterior.
        purchase.is_active = false;
        if let Err(err) = self.purchases.save(&purchase).await {
            if let Some(before) = previous {
                if let Err(undo_err) = self.customers.save(&before).await {
                    tracing::error!(
                        customer_id = %before.id,
                        "Falha ao restaurar saldo após erro no estorno: {:?}", undo_err
                    );
                }
            }
            return Err(err);
        }

        tracing::info!(
            purchase_id = %purchase.id,
            reversed = %purchase.cashback_amount,
            "↩️ Compra estornada"
        );
        Ok(())
    }
}
