//! Per-namespace API accessors.

mod customer;
mod external_app;
mod other;

pub use customer::CustomerApi;
pub use external_app::ExternalAppApi;
pub use other::OtherApi;
