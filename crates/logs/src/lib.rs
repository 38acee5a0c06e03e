//! Remote diagnostics log: fetches placeholder user records and projects them
//! into synthetic log entries for the dashboard's Logs page.

pub mod http;
pub mod source;
