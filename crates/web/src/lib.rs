//! Response envelope shared by every handler of the SMTP Notifier API.
//!
//! Successful responses look like `{"_status": 200, "data": ...}` and failures
//! like `{"_status": 404, "error": {"type": "NOT_FOUND", "message": "..."}}`.

pub mod response;
