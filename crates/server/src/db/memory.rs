//! In-memory record store.
//!
//! Suitable for:
//! - Tests (every test gets a fresh, isolated store)
//! - Local demos with `FLOWRITE_STORE=memory`
//!
//! All state lives behind one `RwLock`, so each operation is atomic with
//! respect to the others, the same guarantee a single SQL statement gives.
//! Data is lost when the process exits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use flowrite_core::{
    Account, AccountId, Customer, CustomerFields, CustomerId, Email, Item, ItemFields, ItemId,
    Page, Submission, SubmissionFields, SubmissionId, SubmissionStats,
};

use super::{AccountCredentials, RepositoryError, Store};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i32, AccountCredentials>,
    customers: BTreeMap<i32, Customer>,
    submissions: BTreeMap<i32, Submission>,
    items: BTreeMap<i32, Item>,
    last_id: i32,
}

impl Tables {
    /// Ids are unique across all tables, like a shared sequence.
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn owned_submissions(&self, owner: AccountId) -> impl Iterator<Item = &Submission> {
        self.submissions.values().filter(move |s| s.owner_id == owner)
    }
}

fn most_recent_first(mut submissions: Vec<Submission>) -> Vec<Submission> {
    submissions.sort_by(Submission::most_recent_first);
    submissions
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Process-local record store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    // ─────────────────────────────── Accounts ───────────────────────────────

    async fn create_account(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.values().any(|c| &c.account.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(tables.next_id()),
            email: email.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.accounts.insert(
            account.id.as_i32(),
            AccountCredentials {
                account: account.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(account)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.get(&id.as_i32()).map(|c| c.account.clone()))
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<AccountCredentials>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|c| &c.account.email == email)
            .cloned())
    }

    // ─────────────────────────────── Customers ──────────────────────────────

    async fn create_customer(
        &self,
        owner: AccountId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let customer = Customer {
            id: CustomerId::new(tables.next_id()),
            owner_id: owner,
            name: fields.name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            address: fields.address.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.customers.insert(customer.id.as_i32(), customer.clone());
        Ok(customer)
    }

    async fn list_customers(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut customers: Vec<Customer> = tables
            .customers
            .values()
            .filter(|c| c.owner_id == owner)
            .cloned()
            .collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page.apply(customers))
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.customers.get(&id.as_i32()).cloned())
    }

    async fn update_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        let mut tables = self.tables.write().await;
        let customer = tables
            .customers
            .get_mut(&id.as_i32())
            .filter(|c| c.owner_id == owner)
            .ok_or(RepositoryError::NotFound)?;

        customer.name.clone_from(&fields.name);
        customer.email.clone_from(&fields.email);
        customer.phone.clone_from(&fields.phone);
        customer.address.clone_from(&fields.address);
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    async fn delete_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
        cascade: bool,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        let is_owned = tables
            .customers
            .get(&id.as_i32())
            .is_some_and(|c| c.owner_id == owner);
        if !is_owned {
            return Err(RepositoryError::NotFound);
        }
        let customer = tables
            .customers
            .remove(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;

        let linked = |s: &Submission| {
            s.owner_id == owner && (s.customer_id == Some(id) || s.customer_name == customer.name)
        };

        if cascade {
            let before = tables.submissions.len();
            tables.submissions.retain(|_, s| !linked(s));
            return Ok((before - tables.submissions.len()) as u64);
        }

        for submission in tables.submissions.values_mut() {
            if submission.customer_id == Some(id) {
                submission.customer_id = None;
            }
        }
        Ok(0)
    }

    async fn search_customers(
        &self,
        owner: AccountId,
        query: &str,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        let mut matches: Vec<Customer> = tables
            .customers
            .values()
            .filter(|c| c.owner_id == owner)
            .filter(|c| {
                contains_ci(Some(&c.name), &needle)
                    || contains_ci(c.email.as_ref().map(Email::as_str), &needle)
                    || contains_ci(c.phone.as_deref(), &needle)
                    || contains_ci(c.address.as_deref(), &needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn find_customer_by_name(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| c.owner_id == owner && c.name == name)
            .cloned())
    }

    // ────────────────────────────── Submissions ─────────────────────────────

    async fn create_submission(
        &self,
        owner: AccountId,
        fields: &SubmissionFields,
    ) -> Result<Submission, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let submission = Submission {
            id: SubmissionId::new(tables.next_id()),
            owner_id: owner,
            customer_name: fields.customer_name.clone(),
            customer_id: fields.customer_id,
            date: fields.date,
            time: fields.time.clone(),
            address: fields.address.clone(),
            order_details: fields.order_details.clone(),
            amount: fields.amount,
            rego: fields.rego.clone(),
            signature_image: fields.signature_image.clone(),
            created_at: now,
            updated_at: now,
        };
        tables
            .submissions
            .insert(submission.id.as_i32(), submission.clone());
        Ok(submission)
    }

    async fn list_submissions(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let tables = self.tables.read().await;
        let owned = tables.owned_submissions(owner).cloned().collect();
        Ok(page.apply(most_recent_first(owned)))
    }

    async fn get_submission(
        &self,
        id: SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.submissions.get(&id.as_i32()).cloned())
    }

    async fn update_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
        fields: &SubmissionFields,
    ) -> Result<Submission, RepositoryError> {
        let mut tables = self.tables.write().await;
        let submission = tables
            .submissions
            .get_mut(&id.as_i32())
            .filter(|s| s.owner_id == owner)
            .ok_or(RepositoryError::NotFound)?;

        submission.customer_name.clone_from(&fields.customer_name);
        submission.customer_id = fields.customer_id;
        submission.date = fields.date;
        submission.time.clone_from(&fields.time);
        submission.address.clone_from(&fields.address);
        submission.order_details.clone_from(&fields.order_details);
        submission.amount = fields.amount;
        submission.rego.clone_from(&fields.rego);
        submission.signature_image.clone_from(&fields.signature_image);
        submission.updated_at = Utc::now();
        Ok(submission.clone())
    }

    async fn delete_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let is_owned = tables
            .submissions
            .get(&id.as_i32())
            .is_some_and(|s| s.owner_id == owner);
        if !is_owned {
            return Err(RepositoryError::NotFound);
        }
        tables.submissions.remove(&id.as_i32());
        Ok(())
    }

    async fn submissions_in_range(
        &self,
        owner: AccountId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let tables = self.tables.read().await;
        let matching = tables
            .owned_submissions(owner)
            .filter(|s| start <= s.date && s.date <= end)
            .cloned()
            .collect();
        Ok(most_recent_first(matching))
    }

    async fn submissions_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let tables = self.tables.read().await;
        let matching = tables
            .owned_submissions(owner)
            .filter(|s| s.customer_name == name)
            .cloned()
            .collect();
        Ok(most_recent_first(matching))
    }

    async fn delete_submissions_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.submissions.len();
        tables
            .submissions
            .retain(|_, s| !(s.owner_id == owner && s.customer_name == name));
        Ok((before - tables.submissions.len()) as u64)
    }

    async fn submission_stats(
        &self,
        owner: AccountId,
    ) -> Result<SubmissionStats, RepositoryError> {
        let tables = self.tables.read().await;
        SubmissionStats::from_submissions(tables.owned_submissions(owner))
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }

    // ──────────────────────────────── Items ─────────────────────────────────

    async fn create_item(
        &self,
        owner: AccountId,
        fields: &ItemFields,
    ) -> Result<Item, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let item = Item {
            id: ItemId::new(tables.next_id()),
            owner_id: owner,
            name: fields.name.clone(),
            unit: fields.unit.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.items.insert(item.id.as_i32(), item.clone());
        Ok(item)
    }

    async fn list_items(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Item>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Item> = tables
            .items
            .values()
            .filter(|i| i.owner_id == owner)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page.apply(items))
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.items.get(&id.as_i32()).cloned())
    }

    async fn update_item(
        &self,
        owner: AccountId,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<Item, RepositoryError> {
        let mut tables = self.tables.write().await;
        let item = tables
            .items
            .get_mut(&id.as_i32())
            .filter(|i| i.owner_id == owner)
            .ok_or(RepositoryError::NotFound)?;

        item.name.clone_from(&fields.name);
        item.unit.clone_from(&fields.unit);
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete_item(&self, owner: AccountId, id: ItemId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let is_owned = tables
            .items
            .get(&id.as_i32())
            .is_some_and(|i| i.owner_id == owner);
        if !is_owned {
            return Err(RepositoryError::NotFound);
        }
        tables.items.remove(&id.as_i32());
        Ok(())
    }
}
