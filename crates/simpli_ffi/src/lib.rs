//! Flutter bridge surface for the Simpli core.

pub mod api;
