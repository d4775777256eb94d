//! Query strings for list operations
//!
//! Each list endpoint has an explicit set of filters. Unknown parameters are
//! ignored, unset filters are no-ops, and the page size is fixed.

use serde::Deserialize;

use crate::error::Result;
use crate::normalize::normalize_free_text;
use crate::repository::{FilterCondition, Pagination, PAGE_SIZE};
use crate::validation::{current_year, validate_page, validate_year_filter};

fn first_page() -> i64 {
    1
}

/// `GET /romancista?nome=&pagina=`
#[derive(Debug, Clone, Deserialize)]
pub struct NovelistListQuery {
    /// Case-insensitive substring of the name
    #[serde(default, alias = "name")]
    pub nome: Option<String>,

    /// 1-indexed page
    #[serde(default = "first_page")]
    pub pagina: i64,
}

impl NovelistListQuery {
    pub fn filters(&self) -> Vec<FilterCondition> {
        substring("name", self.nome.as_deref()).into_iter().collect()
    }

    pub fn pagination(&self) -> Result<Pagination> {
        Ok(Pagination::page(validate_page(self.pagina)?, PAGE_SIZE))
    }
}

/// `GET /livro?titulo=&ano=&romancista_id=&pagina=`
#[derive(Debug, Clone, Deserialize)]
pub struct BookListQuery {
    /// Case-insensitive substring of the title
    #[serde(default)]
    pub titulo: Option<String>,

    /// Exact publication year
    #[serde(default)]
    pub ano: Option<i32>,

    /// Exact novelist
    #[serde(default)]
    pub romancista_id: Option<i64>,

    /// 1-indexed page
    #[serde(default = "first_page")]
    pub pagina: i64,
}

impl BookListQuery {
    pub fn filters(&self) -> Result<Vec<FilterCondition>> {
        let mut filters: Vec<_> = substring("title", self.titulo.as_deref()).into_iter().collect();

        if let Some(ano) = self.ano {
            filters.push(FilterCondition::eq(
                "year",
                validate_year_filter(ano, current_year())?,
            ));
        }
        if let Some(romancista_id) = self.romancista_id {
            filters.push(FilterCondition::eq("novelist_id", romancista_id));
        }

        Ok(filters)
    }

    pub fn pagination(&self) -> Result<Pagination> {
        Ok(Pagination::page(validate_page(self.pagina)?, PAGE_SIZE))
    }
}

/// Substring filter on normalized text; blank terms filter nothing
fn substring(field: &'static str, term: Option<&str>) -> Option<FilterCondition> {
    let term = normalize_free_text(term?);
    (!term.is_empty()).then(|| FilterCondition::contains(field, &term))
}
