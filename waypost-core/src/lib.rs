pub mod cli;
pub mod compile;
pub mod graph;
pub mod identity;
pub mod logging;
pub mod manager;
pub mod probe;
pub mod project;
pub mod route;
pub mod settings;
pub mod store;
pub mod system;
pub mod testing;
pub mod validation;
