pub mod auth;
pub mod events;
pub mod invitations;
pub mod notifications;
pub mod search;
pub mod votes;
