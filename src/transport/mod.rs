pub mod local;

pub use local::{advertised_host, start_local_server, LocalServer};
