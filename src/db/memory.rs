// src/db/memory.rs
//
// Implementação em memória dos contratos de armazenamento, usada nos testes.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::traits::{CustomerStore, PurchaseStore, StoreDirectory},
    models::{
        customer::{Customer, NewCustomer},
        purchase::{PageRequest, Purchase},
        store::Store,
    },
};

#[derive(Default)]
pub struct MemoryStore {
    customers: Mutex<HashMap<Uuid, Customer>>,
    purchases: Mutex<HashMap<Uuid, Purchase>>,
    stores: Mutex<Vec<Store>>,
    fail_customer_saves: AtomicBool,
    fail_purchase_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_store(&self, name: &str) -> Store {
        let store = Store { id: Uuid::new_v4(), name: name.to_string() };
        self.stores.lock().unwrap().push(store.clone());
        store
    }

    pub fn add_customer(&self, store_id: Uuid, phone: &str, balance: Decimal) -> Customer {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            store_id,
            name: Some(format!("Cliente {phone}")),
            phone_number: phone.to_string(),
            cashback_balance: balance,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.customers.lock().unwrap().insert(customer.id, customer.clone());
        customer
    }

    pub fn customer(&self, id: Uuid) -> Option<Customer> {
        self.customers.lock().unwrap().get(&id).cloned()
    }

    pub fn remove_customer(&self, id: Uuid) {
        self.customers.lock().unwrap().remove(&id);
    }

    pub fn purchase(&self, id: Uuid) -> Option<Purchase> {
        self.purchases.lock().unwrap().get(&id).cloned()
    }

    pub fn purchase_count(&self) -> usize {
        self.purchases.lock().unwrap().len()
    }

    pub fn active_purchase_count(&self) -> usize {
        self.purchases.lock().unwrap().values().filter(|p| p.is_active).count()
    }

    pub fn insert_purchase(&self, purchase: Purchase) {
        self.purchases.lock().unwrap().insert(purchase.id, purchase);
    }

    pub fn fail_customer_saves(&self, fail: bool) {
        self.fail_customer_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_purchase_saves(&self, fail: bool) {
        self.fail_purchase_saves.store(fail, Ordering::SeqCst);
    }
}

fn newest_first(mut purchases: Vec<Purchase>) -> Vec<Purchase> {
    purchases.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
    purchases
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn find_active_by_phone_and_store(
        &self,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .values()
            .find(|c| c.phone_number == phone && c.store_id == store_id && c.is_active)
            .cloned())
    }

    async fn find_by_phone_and_store(
        &self,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .values()
            .find(|c| c.phone_number == phone && c.store_id == store_id)
            .cloned())
    }

    async fn find_active_by_name_and_store(
        &self,
        name: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.name.as_deref() == Some(name) && c.store_id == store_id && c.is_active)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self.customer(id))
    }

    async fn list_active_by_store(&self, store_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let mut customers: Vec<Customer> = self
            .customers
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.store_id == store_id && c.is_active)
            .cloned()
            .collect();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, AppError> {
        let mut customers = self.customers.lock().unwrap();
        if customers
            .values()
            .any(|c| c.store_id == customer.store_id && c.phone_number == customer.phone_number)
        {
            return Err(AppError::PhoneAlreadyRegistered);
        }
        let now = Utc::now();
        let created = Customer {
            id: Uuid::new_v4(),
            store_id: customer.store_id,
            name: customer.name,
            phone_number: customer.phone_number,
            cashback_balance: Decimal::ZERO,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        customers.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, customer: &Customer) -> Result<Customer, AppError> {
        if self.fail_customer_saves.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow!("falha simulada ao gravar cliente")));
        }
        let mut customers = self.customers.lock().unwrap();
        let stored = customers.get_mut(&customer.id).ok_or(AppError::CustomerNotFound)?;
        stored.name = customer.name.clone();
        stored.cashback_balance = customer.cashback_balance;
        stored.is_active = customer.is_active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

#[async_trait]
impl PurchaseStore for MemoryStore {
    async fn save(&self, purchase: &Purchase) -> Result<Purchase, AppError> {
        if self.fail_purchase_saves.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow!("falha simulada ao gravar compra")));
        }
        let mut purchases = self.purchases.lock().unwrap();
        let stored = purchases
            .entry(purchase.id)
            .and_modify(|existing| existing.is_active = purchase.is_active)
            .or_insert_with(|| purchase.clone());
        Ok(stored.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>, AppError> {
        Ok(self.purchase(id))
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Purchase>, AppError> {
        let purchases = self
            .purchases
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.customer_id == customer_id && p.is_active)
            .cloned()
            .collect();
        Ok(newest_first(purchases))
    }

    async fn list_by_store(
        &self,
        store_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Purchase>, AppError> {
        let purchases = self
            .purchases
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.store_id == store_id && p.is_active)
            .filter(|p| since.is_none_or(|start| p.purchase_date >= start))
            .cloned()
            .collect();
        Ok(newest_first(purchases))
    }

    async fn page_by_store(
        &self,
        store_id: Uuid,
        customer_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<Purchase>, i64), AppError> {
        let matching: Vec<Purchase> = self
            .purchases
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.store_id == store_id && p.is_active)
            .filter(|p| customer_id.is_none_or(|id| p.customer_id == id))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let items = newest_first(matching)
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((items, total))
    }
}

#[async_trait]
impl StoreDirectory for MemoryStore {
    async fn list_stores(&self) -> Result<Vec<Store>, AppError> {
        let mut stores = self.stores.lock().unwrap().clone();
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn name_lookup_returns_the_newest_active_customer() {
        let memory = MemoryStore::new();
        let store_id = Uuid::new_v4();
        let older = memory.add_customer(store_id, "111", Decimal::ZERO);
        let newer = memory.add_customer(store_id, "222", Decimal::ZERO);
        {
            let mut customers = memory.customers.lock().unwrap();
            for (id, age) in [(older.id, 2), (newer.id, 1)] {
                let c = customers.get_mut(&id).unwrap();
                c.name = Some("Ana".into());
                c.created_at = Utc::now() - Duration::days(age);
            }
        }

        let found = memory
            .find_active_by_name_and_store("Ana", store_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);
    }
}
