// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

use std::sync::Arc;

use crate::auth::AuthRuntime;
use crate::sms::SmsGateway;
use crate::storage::Database;
use crate::workflow::{LandlordWorkflow, TransitionPolicy};

/// Shared application state, cloned into every handler.
///
/// The database handle is internally synchronized (redb single-writer
/// transactions), so no outer lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<AuthRuntime>,
    pub sms: Arc<dyn SmsGateway>,
    pub policy: TransitionPolicy,
}

impl AppState {
    pub fn new(
        db: Database,
        auth: AuthRuntime,
        sms: Arc<dyn SmsGateway>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            db: Arc::new(db),
            auth: Arc::new(auth),
            sms,
            policy,
        }
    }

    /// The landlord workflow bound to this state's store and policy.
    pub fn landlord_workflow(&self) -> LandlordWorkflow<'_> {
        LandlordWorkflow::new(&self.db, self.policy)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sms::LogSmsGateway;
    use chrono::Duration;

    /// Fresh state over a throwaway database file.
    ///
    /// The file lives under the system temp directory; uniqueness comes from
    /// the UUID in the name, so parallel tests never collide.
    pub(crate) fn test_state() -> AppState {
        let path =
            std::env::temp_dir().join(format!("aggregator-test-{}.redb", uuid::Uuid::new_v4()));
        let db = Database::open(&path).expect("Failed to open test db");
        let auth = AuthRuntime::new("test-secret", Duration::hours(72), Duration::hours(24));
        AppState::new(db, auth, Arc::new(LogSmsGateway), TransitionPolicy::Strict)
    }
}
