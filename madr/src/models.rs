//! Catalog entities and request payloads
//!
//! Request payloads deserialize into `*Schema` (create) and `*Patch`
//! (partial update) types. Their `validate` methods normalize text fields
//! and run the structural checks, producing the typed inputs the
//! repositories accept.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::Result;
use crate::normalize::{normalize_free_text, normalize_identifier};
use crate::validation::{require_any, require_non_empty, validate_email, Field};

// ============================================================================
// Accounts
// ============================================================================

/// A stored account, including its password hash
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Account as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPublic {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<Account> for AccountPublic {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSchema {
    pub username: String,
    pub email: String,
    #[serde(alias = "password")]
    pub senha: String,
}

/// Validated registration data; the password is still plaintext
#[derive(Debug, Clone)]
pub struct AccountInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AccountSchema {
    pub fn validate(self) -> Result<AccountInput> {
        Ok(AccountInput {
            username: require_non_empty("username", normalize_identifier(&self.username))?,
            email: validate_email(&self.email)?,
            password: self.senha,
        })
    }
}

/// New account row with the password already hashed
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Account update payload; any subset of fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPatch {
    #[serde(default)]
    pub username: Field<String>,
    #[serde(default)]
    pub email: Field<String>,
    #[serde(default, alias = "password")]
    pub senha: Field<String>,
}

/// Validated account changes; the password is still plaintext
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl AccountPatch {
    pub fn validate(self) -> Result<AccountChanges> {
        require_any(&[
            self.username.is_provided(),
            self.email.is_provided(),
            self.senha.is_provided(),
        ])?;

        Ok(AccountChanges {
            username: self
                .username
                .into_option()
                .map(|u| require_non_empty("username", normalize_identifier(&u)))
                .transpose()?,
            email: self
                .email
                .into_option()
                .map(|e| validate_email(&e))
                .transpose()?,
            password: self.senha.into_option(),
        })
    }
}

impl AccountChanges {
    /// Merge onto a stored account; `password` must already be hashed
    pub fn apply(self, account: &mut Account) {
        if let Some(username) = self.username {
            account.username = username;
        }
        if let Some(email) = self.email {
            account.email = email;
        }
        if let Some(password) = self.password {
            account.password = password;
        }
    }
}

// ============================================================================
// Novelists
// ============================================================================

/// A novelist
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Novelist {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Novelist creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NovelistSchema {
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNovelist {
    pub name: String,
}

impl NovelistSchema {
    pub fn validate(self) -> Result<NewNovelist> {
        Ok(NewNovelist {
            name: require_non_empty("nome", normalize_free_text(&self.nome))?,
        })
    }
}

/// Novelist update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NovelistPatch {
    #[serde(default)]
    pub nome: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NovelistChanges {
    pub name: Option<String>,
}

impl NovelistPatch {
    pub fn validate(self) -> Result<NovelistChanges> {
        require_any(&[self.nome.is_provided()])?;

        Ok(NovelistChanges {
            name: self
                .nome
                .into_option()
                .map(|n| require_non_empty("nome", normalize_free_text(&n)))
                .transpose()?,
        })
    }
}

impl NovelistChanges {
    pub fn apply(self, novelist: &mut Novelist) {
        if let Some(name) = self.name {
            novelist.name = name;
        }
    }
}

// ============================================================================
// Books
// ============================================================================

/// A book, always attached to a novelist
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "romancista_id")]
    pub novelist_id: i64,
}

/// Book creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct BookSchema {
    pub titulo: String,
    pub ano: i32,
    pub romancista_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub year: i32,
    pub novelist_id: i64,
}

impl BookSchema {
    pub fn validate(self) -> Result<NewBook> {
        Ok(NewBook {
            title: require_non_empty("titulo", normalize_free_text(&self.titulo))?,
            year: self.ano,
            novelist_id: self.romancista_id,
        })
    }
}

/// Book update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    #[serde(default)]
    pub titulo: Field<String>,
    #[serde(default)]
    pub ano: Field<i32>,
    #[serde(default)]
    pub romancista_id: Field<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub novelist_id: Option<i64>,
}

impl BookPatch {
    pub fn validate(self) -> Result<BookChanges> {
        require_any(&[
            self.titulo.is_provided(),
            self.ano.is_provided(),
            self.romancista_id.is_provided(),
        ])?;

        Ok(BookChanges {
            title: self
                .titulo
                .into_option()
                .map(|t| require_non_empty("titulo", normalize_free_text(&t)))
                .transpose()?,
            year: self.ano.into_option(),
            novelist_id: self.romancista_id.into_option(),
        })
    }
}

impl BookChanges {
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(year) = self.year {
            book.year = year;
        }
        if let Some(novelist_id) = self.novelist_id {
            book.novelist_id = novelist_id;
        }
    }
}
