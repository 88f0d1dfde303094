//! Lealtad services: authorization, sessions and tenant-scoped operations
//! over the external record store.

pub mod admin;
pub mod campaigns;
pub mod config;
pub mod context;
pub mod gate;
pub mod identity;
pub mod notifications;
pub mod programs;
pub mod redirect;
pub mod rewards;
pub mod sso;
pub mod staff;
pub mod store;
pub mod submissions;

#[cfg(test)]
mod test_helpers;

mod uuids;
