//! Stepwise API: the resolver layer a transport calls into.
//!
//! - [`session::SessionAssembler`] builds the browser session view.
//! - [`intake::SubmissionIntake`] records submissions and fires the
//!   best-effort chat notification.
//! - [`query::QueryFacade`] lists lessons and submissions.
//! - [`resolvers::Resolvers`] wires them together with the token
//!   authenticator.

pub mod intake;
pub mod notify;
pub mod query;
pub mod resolvers;
pub mod session;

pub use intake::{SubmissionArgs, SubmissionIntake};
pub use notify::{
    ChatNotifier, ChatUser, DisabledNotifier, HttpChatNotifier, NotifyConfig, NotifyError,
    SubmissionNotice,
};
pub use query::QueryFacade;
pub use resolvers::{ResolverConfig, Resolvers, Stores};
pub use session::{SessionAssembler, SessionView};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
