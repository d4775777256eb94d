//! User-facing message catalog
//!
//! Every `{"message": ...}` body the service returns is drawn from here, so
//! wording stays identical across handlers and tests.

pub const ACCOUNT_USERNAME_CONFLICT: &str = "Nome de usuário já consta no MADR";
pub const ACCOUNT_EMAIL_CONFLICT: &str = "Email já consta no MADR";
pub const ACCOUNT_DELETED: &str = "Conta deletada com sucesso";
pub const ACCOUNT_NOT_FOUND: &str = "Conta não consta no MADR";

pub const AUTH_INVALID_CREDENTIALS: &str = "Email ou senha incorretos";
pub const AUTH_NOT_AUTHORIZED: &str = "Não autorizado";

pub const BOOK_NOT_FOUND: &str = "Livro não consta no MADR";
pub const BOOK_DELETED: &str = "Livro deletado do MADR";

pub const NOVELIST_CONFLICT: &str = "Romancista já consta no MADR";
pub const NOVELIST_NOT_FOUND: &str = "Romancista não consta no MADR";
pub const NOVELIST_DELETED: &str = "Romancista deletado no MADR";

pub const DATA_MISSING_FIELDS: &str = "Pelo menos um campo deve ser fornecido";
pub const INVALID_EMAIL: &str = "Email inválido";
pub const INVALID_PAGE: &str = "A página deve ser maior ou igual a 1";

pub const INTERNAL_ERROR: &str = "Erro interno do servidor";

pub const ROOT_GREETING: &str = "Hello there!";

/// Message for a required text field that is empty after normalization
pub fn empty_field(field: &str) -> String {
    format!("O campo '{}' não pode ser vazio", field)
}

/// Message for a password below the configured minimum length
pub fn password_too_short(min: usize) -> String {
    format!("A senha deve ter pelo menos {} caracteres", min)
}

/// Message for a year filter past the accepted upper bound
pub fn year_out_of_range(max: i32) -> String {
    format!("O ano deve ser menor ou igual a {}", max)
}

/// Message for an integrity violation that maps to no domain conflict
pub fn integrity_failure(detail: &str) -> String {
    format!("Erro de integridade: ({})", detail)
}
