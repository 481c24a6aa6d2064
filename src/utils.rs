pub(crate) const fn record_schema_version() -> &'static str {
    "1.0"
}
