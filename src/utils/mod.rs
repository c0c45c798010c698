pub mod auth;
pub mod events;
pub mod invitations;
pub mod notifications;
pub mod policy;
pub mod search;
pub mod votes;
