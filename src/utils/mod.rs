pub mod csv_export;
pub mod session_cache;
