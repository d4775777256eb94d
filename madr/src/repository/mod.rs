//! Persistence for accounts, novelists and books
//!
//! Novelists and books implement the generic [`Repository`] trait; accounts
//! expose the lookups authentication needs on top of plain CRUD.

mod accounts;
mod books;
mod novelists;
mod pagination;
mod traits;

pub use accounts::AccountRepository;
pub use books::BookRepository;
pub use novelists::NovelistRepository;
pub use pagination::{
    escape_like, push_filters, push_window, FilterCondition, FilterOperator, FilterValue,
    Pagination, PAGE_SIZE,
};
pub use traits::Repository;
