// src/services/customer_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CustomerStore,
    models::customer::{normalize_phone, CashbackBalance, Customer, NewCustomer},
};

#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerStore>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerStore>) -> Self {
        Self { customers }
    }

    /// Cadastra o cliente com saldo zero. O telefone é guardado só com dígitos
    /// e não pode repetir dentro da loja (nem entre clientes desativados).
    pub async fn add_customer(
        &self,
        store_id: Uuid,
        name: Option<&str>,
        phone: &str,
    ) -> Result<Customer, AppError> {
        let phone_number = canonical_phone(phone)?;

        if self
            .customers
            .find_by_phone_and_store(&phone_number, store_id)
            .await?
            .is_some()
        {
            return Err(AppError::PhoneAlreadyRegistered);
        }

        let name = name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        let customer = self
            .customers
            .insert(NewCustomer { store_id, name, phone_number })
            .await?;

        tracing::info!(customer_id = %customer.id, store_id = %store_id, "👤 Cliente cadastrado");
        Ok(customer)
    }

    pub async fn list_customers(&self, store_id: Uuid) -> Result<Vec<Customer>, AppError> {
        self.customers.list_active_by_store(store_id).await
    }

    /// Só o nome é editável; o saldo é responsabilidade do ledger.
    pub async fn rename_customer(
        &self,
        store_id: Uuid,
        customer_id: Uuid,
        name: Option<&str>,
    ) -> Result<Customer, AppError> {
        let mut customer = self.owned_customer(store_id, customer_id).await?;
        customer.name = name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        self.customers.save(&customer).await
    }

    pub async fn deactivate_customer(&self, store_id: Uuid, customer_id: Uuid) -> Result<(), AppError> {
        let mut customer = self.owned_customer(store_id, customer_id).await?;
        customer.is_active = false;
        self.customers.save(&customer).await?;

        tracing::info!(customer_id = %customer_id, "🗑️ Cliente desativado");
        Ok(())
    }

    pub async fn search_by_phone(&self, store_id: Uuid, phone: &str) -> Result<Customer, AppError> {
        let phone_number = canonical_phone(phone)?;
        self.customers
            .find_active_by_phone_and_store(&phone_number, store_id)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    /// Consulta pública: qualquer pessoa com o id da loja e o telefone.
    pub async fn cashback_balance(&self, store_id: Uuid, phone: &str) -> Result<CashbackBalance, AppError> {
        let customer = self.search_by_phone(store_id, phone).await?;
        Ok(CashbackBalance {
            store_id: customer.store_id,
            phone_number: customer.phone_number,
            balance: customer.cashback_balance,
            customer_name: customer.name,
        })
    }

    async fn owned_customer(&self, store_id: Uuid, customer_id: Uuid) -> Result<Customer, AppError> {
        self.customers
            .find_by_id(customer_id)
            .await?
            .filter(|c| c.belongs_to(store_id))
            .ok_or(AppError::CustomerNotFound)
    }
}

fn canonical_phone(raw: &str) -> Result<String, AppError> {
    let phone = normalize_phone(raw);
    if phone.is_empty() {
        return Err(AppError::field(
            "phone_number",
            "required",
            "O número de telefone é obrigatório.",
        ));
    }
    Ok(phone)
}
