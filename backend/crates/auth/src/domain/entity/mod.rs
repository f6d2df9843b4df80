pub mod audit_event;
pub mod auth_session;
pub mod id_token;
pub mod signin_request;
pub mod token_set;
pub mod userinfo_token;
