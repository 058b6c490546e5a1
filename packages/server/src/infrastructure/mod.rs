//! Infrastructure layer: the broadcast hub engine and the concrete
//! implementations of domain interfaces.

pub mod auth;
pub mod dto;
pub mod hub;
pub mod repository;
