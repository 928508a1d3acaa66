use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::database::manager::{Database, DatabaseError};
use crate::database::models::{Admin, NewAdmin};

const ADMIN_COLUMNS: &str = "id, email, username, password_hash, role, created_at";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Outcome of an idempotent insert keyed by email.
#[derive(Debug, Clone)]
pub enum Upserted {
    Created(Admin),
    Existing(Admin),
}

impl Upserted {
    pub fn admin(&self) -> &Admin {
        match self {
            Upserted::Created(admin) | Upserted::Existing(admin) => admin,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }
}

/// Identity storage. Uniqueness of email and username is left to the
/// table constraints.
#[derive(Clone, Debug)]
pub struct AdminStore {
    db: Database,
    bcrypt_cost: u32,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AdminStore {
    pub fn new(db: Database, bcrypt_cost: u32) -> Self {
        Self {
            db,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Inserts the identity unless one with the same email already exists.
    ///
    /// An existing row is returned untouched, including its password. A new
    /// email whose username is already taken is a `Conflict`.
    pub async fn upsert(&self, new_admin: NewAdmin) -> Result<Upserted, DatabaseError> {
        if let Some(existing) = self.find_by_email(&new_admin.email).await? {
            return Ok(Upserted::Existing(existing));
        }

        let id = Uuid::new_v4();
        let password_hash = hash_password(&new_admin.password, self.bcrypt_cost).await?;

        let sql = "INSERT INTO admins (id, email, username, password_hash, role, created_at) \
                   VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT DO NOTHING";
        let query = sqlx::query(sql)
            .bind(id)
            .bind(&new_admin.email)
            .bind(&new_admin.username)
            .bind(&password_hash)
            .bind(new_admin.role.as_str())
            .bind(Utc::now());
        self.db.run(query.execute(self.db.pool())).await?;

        match self.find_by_email(&new_admin.email).await? {
            Some(admin) if admin.id == id => {
                info!("Created {} identity '{}'", admin.role, admin.username);
                Ok(Upserted::Created(admin))
            }
            Some(admin) => Ok(Upserted::Existing(admin)),
            None => Err(DatabaseError::Conflict(format!(
                "Username '{}' is already taken",
                new_admin.username
            ))),
        }
    }

    /// Strict insert. Any uniqueness violation is a `Conflict`.
    pub async fn create(&self, new_admin: NewAdmin) -> Result<Admin, DatabaseError> {
        let password_hash = hash_password(&new_admin.password, self.bcrypt_cost).await?;

        let sql = format!(
            "INSERT INTO admins ({}) VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
            ADMIN_COLUMNS, ADMIN_COLUMNS
        );
        let query = sqlx::query_as::<_, Admin>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_admin.email)
            .bind(&new_admin.username)
            .bind(&password_hash)
            .bind(new_admin.role.as_str())
            .bind(Utc::now());

        let admin = self
            .db
            .run(query.fetch_one(self.db.pool()))
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => DatabaseError::Conflict(format!(
                    "An identity with email '{}' or username '{}' already exists",
                    new_admin.email, new_admin.username
                )),
                other => other,
            })?;

        info!("Created {} identity '{}'", admin.role, admin.username);
        Ok(admin)
    }

    /// Looks the login up by email or username and checks the password.
    ///
    /// Unknown login and wrong password produce the same error and cost
    /// one bcrypt verification each.
    pub async fn find_by_credentials(&self, login: &str, password: &str) -> Result<Admin, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM admins WHERE email = ? OR username = ? LIMIT 1",
            ADMIN_COLUMNS
        );
        let login = login.trim();
        let query = sqlx::query_as::<_, Admin>(&sql).bind(login).bind(login);
        let found = self.db.run(query.fetch_optional(self.db.pool())).await?;

        match found {
            Some(admin) => {
                if verify_password(password, &admin.password_hash).await? {
                    Ok(admin)
                } else {
                    Err(DatabaseError::NotFound(INVALID_CREDENTIALS.to_string()))
                }
            }
            None => {
                let dummy = self.dummy_hash().await?;
                let _ = verify_password(password, dummy).await?;
                Err(DatabaseError::NotFound(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, DatabaseError> {
        let sql = format!("SELECT {} FROM admins WHERE id = ?", ADMIN_COLUMNS);
        let query = sqlx::query_as::<_, Admin>(&sql).bind(id);
        self.db.run(query.fetch_optional(self.db.pool())).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, DatabaseError> {
        let sql = format!("SELECT {} FROM admins WHERE email = ?", ADMIN_COLUMNS);
        let query = sqlx::query_as::<_, Admin>(&sql).bind(email.trim());
        self.db.run(query.fetch_optional(self.db.pool())).await
    }

    pub async fn list(&self) -> Result<Vec<Admin>, DatabaseError> {
        let sql = format!("SELECT {} FROM admins ORDER BY created_at ASC, email ASC", ADMIN_COLUMNS);
        let query = sqlx::query_as::<_, Admin>(&sql);
        self.db.run(query.fetch_all(self.db.pool())).await
    }

    async fn dummy_hash(&self) -> Result<&String, DatabaseError> {
        let cost = self.bcrypt_cost;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| async move {
                debug!("Preparing dummy password hash");
                hash_password("not-a-real-password", cost).await
            })
            .await?;
        Ok(hash)
    }
}
