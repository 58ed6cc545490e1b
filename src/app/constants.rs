pub(crate) const STATUS_READY: &str = "Ready";
pub(crate) const STATUS_CANCELLED: &str = "Transfer cancelled";
pub(crate) const STATUS_COMPLETE: &str = "Transfer complete";
pub(crate) const STATUS_ALREADY_ACTIVE: &str = "A transfer is already in progress";
pub(crate) const STATUS_NOT_CONNECTED: &str = "Not connected to a remote host";

pub(crate) const CANCEL_PROMPT: &str = "Cancel transfer? (y/n)";
pub(crate) const QUIT_PROMPT: &str = "A transfer is still running. Cancel it and quit? (y/n)";

pub(crate) const NO_HOSTS_MESSAGE: &str = "No servers found, please check ~/.ssh/config";

pub(crate) const LOG_TIMESTAMP_FORMAT: &str = "%m-%d %H:%M:%S";
pub(crate) const LOG_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const LOG_SEPARATOR: &str = " | ";
pub(crate) const LOG_NO_LOGS_MESSAGE: &str = "No logs yet";

pub(crate) const LOG_RETENTION_DAYS: i64 = 7;
pub(crate) const LOG_MAX_ENTRIES: usize = 10_000;
pub(crate) const LOG_MAX_IN_MEMORY: usize = 100;

pub(crate) const PAGE_STEP: isize = 10;
