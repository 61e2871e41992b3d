// Handlers sit behind the guard chain composed in the router: by the time a
// protected handler runs, the actor and any path-addressed resources are
// already resolved, ownership-checked and attached as typed extensions.
pub mod auth;
pub mod budgets;
pub mod expenses;
