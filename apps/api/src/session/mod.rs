// Session State Store.
// Every screening conversation owns one `Session`; nothing is shared between sessions
// and nothing outlives the process.

pub mod models;
pub mod store;
