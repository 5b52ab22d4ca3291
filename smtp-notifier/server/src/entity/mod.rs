mod notifier;

pub use self::notifier::{
    CreateNotifierRequest, MediaSource, Notifier, PutSettingRequest, SendNotificationRequest,
    SendNotificationResponse,
};
