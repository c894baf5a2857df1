/// Current time as a unix timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
