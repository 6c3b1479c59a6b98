use std::sync::Arc;

use sea_orm::DatabaseConnection;

use reserva_core::health::ReadinessProbe;
use reserva_domain::clock::Clock;
use reserva_domain::id::ChannelId;

use crate::domain::event::EventNormalizer;
use crate::domain::types::VenueProfile;
use crate::infra::db::DbBookingStore;
use crate::infra::messenger::TelegramMessenger;
use crate::infra::platform::HttpPlatformClient;
use crate::scheduler::LifecycleScheduler;
use crate::usecase::lifecycle::LifecycleJobHandler;
use crate::usecase::notify::Notifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub scheduler: Arc<LifecycleScheduler>,
    pub messenger: TelegramMessenger,
    pub platform: HttpPlatformClient,
    pub events: EventNormalizer,
    pub venue: Arc<VenueProfile>,
    pub clock: Arc<dyn Clock>,
    pub support_channel: Option<ChannelId>,
}

impl AppState {
    pub fn store(&self) -> DbBookingStore {
        DbBookingStore {
            db: self.db.clone(),
        }
    }

    pub fn notifier(&self) -> Notifier<DbBookingStore, TelegramMessenger> {
        Notifier {
            log: self.store(),
            messenger: self.messenger.clone(),
            venue: self.venue.clone(),
            clock: self.clock.clone(),
            support_channel: self.support_channel,
        }
    }

    pub fn job_handler(&self) -> LifecycleJobHandler<DbBookingStore, TelegramMessenger> {
        LifecycleJobHandler {
            store: self.store(),
            notifier: self.notifier(),
        }
    }
}

impl ReadinessProbe for AppState {
    async fn is_ready(&self) -> bool {
        self.store().ping().await
    }
}
