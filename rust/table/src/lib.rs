pub mod errors;
pub mod events;
pub mod logging;
pub mod session;
pub mod settings;

pub use errors::TableError;
pub use events::{ChannelObserver, EventBus, EventSubscription, TableEvent};
pub use logging::{init_logging, init_test_logging, CapturedEvent, LogFormat, TestLogSubscriber};
pub use session::{SeatView, SessionManager, Table, TableId, TableSnapshot};
pub use settings::{ResolvedSettings, SettingsError, SettingsSources, TableSettings, ValueSource};
