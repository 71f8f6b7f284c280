pub mod config;
mod constructors;
pub mod context;
pub mod controllers;
pub mod entities;
pub mod interactors;
pub mod repositories;
pub mod usecases;
pub(crate) mod utils;
pub mod validation;

pub use constructors::*;
