mod notifier;

pub use self::notifier::NotifierSqlExecutor;
