pub mod health;
pub mod pastes;
