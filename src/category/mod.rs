//! Categories group a user's expenses, e.g. 'Groceries' or 'Rent'.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, delete_category, get_all_categories, get_category,
    update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{
    Category, CategoryFields, CategoryForm, CategoryId, CategoryName, DEFAULT_CATEGORY_COLOR,
    DEFAULT_CATEGORY_ICON,
};
pub use edit::update_category_endpoint;
pub use list::{get_categories_endpoint, get_category_endpoint};
