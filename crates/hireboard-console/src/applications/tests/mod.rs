mod common;
mod stats;
mod url_sync;
