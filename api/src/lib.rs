// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - infrastructure: DB/cache/crypto adapters
// - presentation: HTTP handlers, extractors and routing
// - application: ports, use cases and cross-cutting services
// - domain: core models and pricing rules

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
