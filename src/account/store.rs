/// Account and company persistence using runtime sqlx queries
use crate::{
    db::models::{Account, Company},
    error::{ApiError, ApiResult},
};
use sqlx::SqlitePool;

const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, password_hash, status, role, \
     company_id, email_confirmed, is_deleted, created_at";

/// Account persistence service
#[derive(Clone)]
pub struct AccountStore {
    db: SqlitePool,
}

impl AccountStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a new account row
    pub async fn create(&self, account: &Account) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO account (id, email, first_name, last_name, password_hash, status, role, \
             company_id, email_confirmed, is_deleted, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.password_hash)
        .bind(account.status)
        .bind(account.role)
        .bind(account.company_id)
        .bind(account.email_confirmed)
        .bind(account.is_deleted)
        .bind(account.created_at)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Find an account by email, case-insensitively
    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE email = ?1"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(account)
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(account)
    }

    /// Check whether an email is already registered
    pub async fn email_exists(&self, email: &str) -> ApiResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE email = ?1")
            .bind(email.to_lowercase())
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(count > 0)
    }

    /// Persist the outcome of a successful email confirmation
    pub async fn save_confirmation(&self, account: &Account) -> ApiResult<()> {
        sqlx::query("UPDATE account SET status = ?1, email_confirmed = ?2 WHERE id = ?3")
            .bind(account.status)
            .bind(account.email_confirmed)
            .bind(&account.id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }

    pub async fn update_password_hash(&self, account_id: &str, hash: &str) -> ApiResult<()> {
        sqlx::query("UPDATE account SET password_hash = ?1 WHERE id = ?2")
            .bind(hash)
            .bind(account_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }

    /// List accounts of one company. Every listing in the system goes
    /// through a company filter; an unscoped variant deliberately does not
    /// exist.
    pub async fn list_by_company(&self, company_id: i64) -> ApiResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account \
             WHERE company_id = ?1 AND is_deleted = 0 ORDER BY created_at"
        ))
        .bind(company_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(accounts)
    }

    /// Soft delete, scoped to one company so a caller can never reach an
    /// account outside their own tenant. The row stays for audit but never
    /// authenticates again.
    pub async fn soft_delete(&self, company_id: i64, account_id: &str) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE account SET is_deleted = 1 \
             WHERE id = ?1 AND company_id = ?2 AND is_deleted = 0",
        )
        .bind(account_id)
        .bind(company_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::AccountNotFound);
        }

        Ok(())
    }
}

/// Company persistence service
#[derive(Clone)]
pub struct CompanyStore {
    db: SqlitePool,
}

impl CompanyStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a company and return it with its assigned id
    pub async fn create(&self, company: &Company) -> ApiResult<Company> {
        let result = sqlx::query(
            "INSERT INTO company (name, vat_number, street_one, street_two, country, city, \
             state, zip, is_deleted) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&company.name)
        .bind(&company.vat_number)
        .bind(&company.street_one)
        .bind(&company.street_two)
        .bind(&company.country)
        .bind(&company.city)
        .bind(&company.state)
        .bind(&company.zip)
        .bind(company.is_deleted)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let mut created = company.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, vat_number, street_one, street_two, country, city, state, zip, \
             is_deleted FROM company WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(company)
    }

    /// Hard delete; used only as the compensating action when the first
    /// account of a freshly registered company fails to persist.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        sqlx::query("DELETE FROM company WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn setup_test_db() -> SqlitePool {
    let db = SqlitePool::connect(":memory:").await.unwrap();

    sqlx::query(
        r#"
        CREATE TABLE company (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            vat_number TEXT NOT NULL,
            street_one TEXT NOT NULL,
            street_two TEXT,
            country TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            zip TEXT NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(&db)
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE account (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            status INTEGER NOT NULL DEFAULT 0,
            role INTEGER NOT NULL DEFAULT 0,
            company_id INTEGER NOT NULL,
            email_confirmed BOOLEAN NOT NULL DEFAULT 0,
            is_deleted BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(&db)
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE refresh_token (
            id TEXT PRIMARY KEY,
            token TEXT NOT NULL,
            account_id TEXT UNIQUE NOT NULL,
            created_at DATETIME NOT NULL,
            expires_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(&db)
    .await
    .unwrap();

    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::test_fixtures;
    use crate::db::models::{AccountRole, AccountStatus};

    async fn company_fixture(store: &CompanyStore, name: &str) -> Company {
        store
            .create(&Company {
                id: 0,
                name: name.to_string(),
                vat_number: "VAT-1".to_string(),
                street_one: "1 Test St".to_string(),
                street_two: None,
                country: "NL".to_string(),
                city: "Amsterdam".to_string(),
                state: "NH".to_string(),
                zip: "1000AA".to_string(),
                is_deleted: false,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn email_lookup_is_case_insensitive() {
        let db = setup_test_db().await;
        let store = AccountStore::new(db);

        let account = test_fixtures::account("Alice@Example.com", 1);
        store.create(&account).await.unwrap();

        let found = store.find_by_email("ALICE@example.COM").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().id, account.id);

        assert!(store.email_exists("alice@EXAMPLE.com").await.unwrap());
    }

    #[tokio::test]
    async fn list_by_company_never_crosses_tenants() {
        let db = setup_test_db().await;
        let accounts = AccountStore::new(db.clone());
        let companies = CompanyStore::new(db);

        let tenant_a = company_fixture(&companies, "Tenant A").await;
        let tenant_b = company_fixture(&companies, "Tenant B").await;

        accounts
            .create(&test_fixtures::account("a1@a.com", tenant_a.id))
            .await
            .unwrap();
        accounts
            .create(&test_fixtures::account("a2@a.com", tenant_a.id))
            .await
            .unwrap();
        accounts
            .create(&test_fixtures::account("b1@b.com", tenant_b.id))
            .await
            .unwrap();

        let listed = accounts.list_by_company(tenant_a.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|a| a.company_id == tenant_a.id));

        let listed_b = accounts.list_by_company(tenant_b.id).await.unwrap();
        assert_eq!(listed_b.len(), 1);
        assert_eq!(listed_b[0].email, "b1@b.com");
    }

    #[tokio::test]
    async fn soft_deleted_accounts_drop_out_of_listings() {
        let db = setup_test_db().await;
        let store = AccountStore::new(db);

        let account = test_fixtures::account("gone@example.com", 1);
        store.create(&account).await.unwrap();
        store.soft_delete(1, &account.id).await.unwrap();

        assert!(store.list_by_company(1).await.unwrap().is_empty());

        // The row itself survives for audit
        let found = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(found.is_deleted);

        // A second delete finds nothing left to update
        match store.soft_delete(1, &account.id).await {
            Err(ApiError::AccountNotFound) => {}
            other => panic!("Expected AccountNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn soft_delete_cannot_cross_company_boundaries() {
        let db = setup_test_db().await;
        let store = AccountStore::new(db);

        let account = test_fixtures::account("member@a.com", 1);
        store.create(&account).await.unwrap();

        // A caller from another company gets not-found, not a deletion
        match store.soft_delete(2, &account.id).await {
            Err(ApiError::AccountNotFound) => {}
            other => panic!("Expected AccountNotFound, got {:?}", other),
        }

        let found = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(!found.is_deleted);
    }

    #[tokio::test]
    async fn save_confirmation_persists_status_and_flag() {
        let db = setup_test_db().await;
        let store = AccountStore::new(db);

        let mut account = test_fixtures::account("alice@example.com", 1);
        store.create(&account).await.unwrap();

        account.confirm().unwrap();
        store.save_confirmation(&account).await.unwrap();

        let found = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(found.status, AccountStatus::Active);
        assert!(found.email_confirmed);
        assert_eq!(found.role, AccountRole::User);
    }

    #[tokio::test]
    async fn company_delete_removes_row() {
        let db = setup_test_db().await;
        let companies = CompanyStore::new(db);

        let company = company_fixture(&companies, "Doomed").await;
        companies.delete(company.id).await.unwrap();

        assert!(companies.find_by_id(company.id).await.unwrap().is_none());
    }
}
