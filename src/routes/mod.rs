pub mod method_override;
pub mod routes;
