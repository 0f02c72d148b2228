// SPDX-License-Identifier: MPL-2.0

mod session;
pub mod settings;

pub use session::{Authenticator, Caller, SessionError};
pub use settings::ServerSettings;
