#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod http;

pub(crate) use db::{get_test_connection, insert_test_user};
pub(crate) use http::{assert_status_ok, get_header, parse_json};
